//! 同步计划：按相对路径配对两侧文件，逐对决策并生成同步动作

use crate::core::file_stat::FileStat;
use crate::core::registry::SelectedStrategies;
use crate::core::strategy::{SyncResponse, SyncType};
use crate::error::Result;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::info;

/// 同步动作
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SyncAction {
    /// 传输文件内容，`sync_acl` 表示传输后同时写入 ACL
    Transfer {
        path: String,
        src_path: String,
        dest_path: String,
        size: u64,
        sync_acl: bool,
    },
    /// 内容相同，只更新 ACL
    UpdateAcl { path: String },
    /// 删除目标中多余的文件
    Delete { path: String },
    /// 跳过
    Skip { path: String },
}

impl SyncAction {
    pub fn path(&self) -> &str {
        match self {
            SyncAction::Transfer { path, .. }
            | SyncAction::UpdateAcl { path }
            | SyncAction::Delete { path }
            | SyncAction::Skip { path } => path,
        }
    }

    fn order(&self) -> u8 {
        match self {
            SyncAction::Transfer { .. } => 0,
            SyncAction::UpdateAcl { .. } => 1,
            SyncAction::Delete { .. } => 2,
            SyncAction::Skip { .. } => 3,
        }
    }
}

/// 同步计划生成器：把每个文件对分派给对应类型的策略
pub struct SyncPlanner {
    strategies: SelectedStrategies,
}

impl SyncPlanner {
    pub fn new(strategies: SelectedStrategies) -> Self {
        Self { strategies }
    }

    /// 比较两侧文件表（键为相对路径），返回同步动作列表
    pub fn plan(
        &self,
        source: &HashMap<String, FileStat>,
        dest: &HashMap<String, FileStat>,
    ) -> Result<Vec<SyncAction>> {
        let all_paths: HashSet<&String> = source.keys().chain(dest.keys()).collect();
        let mut actions = Vec::with_capacity(all_paths.len());

        for path in all_paths {
            let src_file = source.get(path);
            let dst_file = dest.get(path);
            let response = self.strategies.determine_should_sync(src_file, dst_file)?;
            actions.push(Self::to_action(path, src_file, dst_file, response));
        }

        // 按动作类型和路径排序，保证输出稳定
        actions.sort_by(|a, b| a.order().cmp(&b.order()).then_with(|| a.path().cmp(b.path())));

        let summary = Self::summarize_actions(&actions);
        info!(
            "同步计划: 传输 {} 个 ({} 字节), 更新 ACL {} 个, 删除 {} 个, 跳过 {} 个",
            summary.transfer_count,
            summary.transfer_bytes,
            summary.total_acl_updates(),
            summary.delete_count,
            summary.skip_count
        );

        Ok(actions)
    }

    fn to_action(
        path: &str,
        src_file: Option<&FileStat>,
        dst_file: Option<&FileStat>,
        response: SyncResponse,
    ) -> SyncAction {
        let path = path.to_string();
        match (SyncType::for_pair(src_file, dst_file), src_file) {
            // 只有目标有：需要操作即删除
            (Some(SyncType::FileNotAtSrc), _) => {
                if response.should_transfer() {
                    SyncAction::Delete { path }
                } else {
                    SyncAction::Skip { path }
                }
            }
            (_, Some(src)) if response.should_transfer() => SyncAction::Transfer {
                path,
                src_path: src.src_path.clone(),
                dest_path: src.dest_path.clone(),
                size: src.size,
                sync_acl: response.should_sync_acl(),
            },
            (_, Some(_)) if response.should_sync_acl() => SyncAction::UpdateAcl { path },
            _ => SyncAction::Skip { path },
        }
    }

    /// 统计同步动作
    pub fn summarize_actions(actions: &[SyncAction]) -> ActionSummary {
        let mut summary = ActionSummary::default();

        for action in actions {
            match action {
                SyncAction::Transfer { size, sync_acl, .. } => {
                    summary.transfer_count += 1;
                    summary.transfer_bytes += size;
                    if *sync_acl {
                        summary.transfer_with_acl_count += 1;
                    }
                }
                SyncAction::UpdateAcl { .. } => summary.acl_update_count += 1,
                SyncAction::Delete { .. } => summary.delete_count += 1,
                SyncAction::Skip { .. } => summary.skip_count += 1,
            }
        }

        summary
    }
}

/// 动作统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSummary {
    pub transfer_count: usize,
    pub transfer_bytes: u64,
    /// 传输时一并写入 ACL 的文件数
    pub transfer_with_acl_count: usize,
    /// 只更新 ACL 的文件数
    pub acl_update_count: usize,
    pub delete_count: usize,
    pub skip_count: usize,
}

impl ActionSummary {
    pub fn total_files(&self) -> usize {
        self.transfer_count + self.acl_update_count + self.delete_count + self.skip_count
    }

    /// 需要写 ACL 的文件总数
    pub fn total_acl_updates(&self) -> usize {
        self.transfer_with_acl_count + self.acl_update_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::acl::{AclData, Grant};
    use crate::core::file_stat::OperationKind;
    use crate::core::strategy::{Strategy, SyncPolicy};
    use chrono::{TimeZone, Utc};

    fn stat(key: &str, size: u64, secs: i64) -> FileStat {
        let time = Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap();
        FileStat::new(
            format!("/data/{key}"),
            format!("bucket/{key}"),
            size,
            time,
            OperationKind::Upload,
        )
    }

    fn files(stats: Vec<(&str, FileStat)>) -> HashMap<String, FileStat> {
        stats.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_plan_defaults() {
        let source = files(vec![
            ("same.txt", stat("same.txt", 10, 0)),
            ("changed.txt", stat("changed.txt", 10, 0)),
            ("new.txt", stat("new.txt", 5, 0)),
        ]);
        let dest = files(vec![
            ("same.txt", stat("same.txt", 10, 0)),
            ("changed.txt", stat("changed.txt", 20, 0)),
            ("extra.txt", stat("extra.txt", 1, 0)),
        ]);

        let planner = SyncPlanner::new(SelectedStrategies::defaults(false));
        let actions = planner.plan(&source, &dest).unwrap();

        let paths: Vec<_> = actions.iter().map(|a| a.path()).collect();
        assert_eq!(paths, vec!["changed.txt", "new.txt", "extra.txt", "same.txt"]);
        assert_eq!(
            actions[0],
            SyncAction::Transfer {
                path: "changed.txt".to_string(),
                src_path: "/data/changed.txt".to_string(),
                dest_path: "bucket/changed.txt".to_string(),
                size: 10,
                sync_acl: false,
            }
        );
        assert!(matches!(actions[2], SyncAction::Skip { .. }));

        let summary = SyncPlanner::summarize_actions(&actions);
        assert_eq!(summary.transfer_count, 2);
        assert_eq!(summary.transfer_bytes, 15);
        assert_eq!(summary.skip_count, 2);
        assert_eq!(summary.total_files(), 4);
    }

    #[test]
    fn test_plan_delete_and_acl() {
        let acl_a = AclData::new("o", vec![Grant::user("o", "READ")]);
        let acl_b = AclData::new("o", vec![Grant::user("o", "WRITE")]);
        let source = files(vec![
            ("a", stat("a", 1, 0).with_acl(acl_a)),
            ("new", stat("new", 2, 0)),
        ]);
        let dest = files(vec![
            ("a", stat("a", 1, 0).with_acl(acl_b)),
            ("gone", stat("gone", 3, 0)),
        ]);

        let mut strategies = SelectedStrategies::defaults(true);
        strategies
            .set(SyncType::FileNotAtSrc, Strategy::new(SyncPolicy::Delete).with_acl(true))
            .unwrap();
        let actions = SyncPlanner::new(strategies).plan(&source, &dest).unwrap();

        assert_eq!(
            actions,
            vec![
                SyncAction::Transfer {
                    path: "new".to_string(),
                    src_path: "/data/new".to_string(),
                    dest_path: "bucket/new".to_string(),
                    size: 2,
                    sync_acl: true,
                },
                SyncAction::UpdateAcl { path: "a".to_string() },
                SyncAction::Delete { path: "gone".to_string() },
            ]
        );

        let summary = SyncPlanner::summarize_actions(&actions);
        assert_eq!(summary.transfer_with_acl_count, 1);
        assert_eq!(summary.acl_update_count, 1);
        assert_eq!(summary.total_acl_updates(), 2);
        assert_eq!(summary.delete_count, 1);
    }

    #[test]
    fn test_plan_empty() {
        let planner = SyncPlanner::new(SelectedStrategies::defaults(false));
        let actions = planner.plan(&HashMap::new(), &HashMap::new()).unwrap();
        assert!(actions.is_empty());
        assert_eq!(SyncPlanner::summarize_actions(&actions), ActionSummary::default());
    }
}
