//! 比较原语：大小、修改时间、ACL
//!
//! 全部是纯函数，只读取传入的两条文件状态。

use crate::core::acl::{separate_owner_grants, Grant};
use crate::core::file_stat::{FileStat, OperationKind};
use chrono::Duration;

/// 大小相同返回 true
pub fn compare_size(src: &FileStat, dest: &FileStat) -> bool {
    src.size == dest.size
}

/// 按修改时间和操作方向判断是否需要更新
///
/// 返回 true 表示不需要更新：
/// - upload / copy：目标不早于源
/// - download：目标（此时为数据来源）不晚于源
pub fn compare_time(src: &FileStat, dest: &FileStat) -> bool {
    let delta = dest.last_modified - src.last_modified;
    match src.operation {
        OperationKind::Upload | OperationKind::Copy => delta >= Duration::zero(),
        OperationKind::Download => delta <= Duration::zero(),
    }
}

/// 精确时间比较：download 时要求两边时间完全一致，其余操作同 [`compare_time`]
pub fn compare_time_exact(src: &FileStat, dest: &FileStat) -> bool {
    match src.operation {
        OperationKind::Download => dest.last_modified == src.last_modified,
        OperationKind::Upload | OperationKind::Copy => compare_time(src, dest),
    }
}

/// ACL 相同返回 true
///
/// 任意一侧没有 ACL 数据时视为相同。
pub fn compare_acl(src: &FileStat, dest: &FileStat) -> bool {
    let (Some(src_acl), Some(dest_acl)) = (&src.acl, &dest.acl) else {
        return true;
    };

    let (mut src_owner, src_other) = separate_owner_grants(&src_acl.grants, &src_acl.owner.id);
    let (mut dest_owner, dest_other) =
        separate_owner_grants(&dest_acl.grants, &dest_acl.owner.id);

    owner_grants_equal(&mut src_owner, &mut dest_owner)
        && other_grants_equal(&src_other, &dest_other)
}

/// 所有者授权只比较权限名（两边所有者 ID 可以不同）
fn owner_grants_equal(src: &mut [&Grant], dest: &mut [&Grant]) -> bool {
    if src.len() != dest.len() {
        return false;
    }

    src.sort_by(|a, b| a.permission_name().cmp(b.permission_name()));
    dest.sort_by(|a, b| a.permission_name().cmp(b.permission_name()));

    src.iter()
        .zip(dest.iter())
        .all(|(a, b)| a.permission_name() == b.permission_name())
}

/// 其他授权与顺序无关，但数量必须一致
fn other_grants_equal(src: &[&Grant], dest: &[&Grant]) -> bool {
    src.len() == dest.len() && src.iter().all(|grant| dest.contains(grant))
}
