//! 同步策略
//!
//! 每个策略绑定一种同步类型（两边都有 / 目标缺失 / 源缺失），对该类型的文件决定
//! 是否传输内容、是否同步 ACL。策略只持有静态配置，可在多个线程间共享。

use crate::core::argument::{ArgumentSpec, ArgumentTable};
use crate::core::comparator::{compare_acl, compare_size, compare_time, compare_time_exact};
use crate::core::file_stat::FileStat;
use crate::core::params::CliParams;
use crate::error::{Result, StrategyError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// 同步类型：文件在源和目标两侧的存在关系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncType {
    /// 源和目标都有
    FileAtSrcAndDest,
    /// 只有源有
    FileNotAtDest,
    /// 只有目标有
    FileNotAtSrc,
}

impl SyncType {
    pub const ALL: [SyncType; 3] = [
        SyncType::FileAtSrcAndDest,
        SyncType::FileNotAtDest,
        SyncType::FileNotAtSrc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncType::FileAtSrcAndDest => "file_at_src_and_dest",
            SyncType::FileNotAtDest => "file_not_at_dest",
            SyncType::FileNotAtSrc => "file_not_at_src",
        }
    }

    /// 根据两侧文件是否存在得到同步类型，两侧都不存在时返回 None
    pub fn for_pair(src: Option<&FileStat>, dest: Option<&FileStat>) -> Option<SyncType> {
        match (src, dest) {
            (Some(_), Some(_)) => Some(SyncType::FileAtSrcAndDest),
            (Some(_), None) => Some(SyncType::FileNotAtDest),
            (None, Some(_)) => Some(SyncType::FileNotAtSrc),
            (None, None) => None,
        }
    }

    pub(crate) fn valid_options() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for SyncType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncType {
    type Err = StrategyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| StrategyError::InvalidSyncType {
                value: s.to_string(),
            })
    }
}

/// 同步判定结果，任意一项为 true 即需要处理
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    should_transfer: bool,
    should_sync_acl: bool,
}

impl SyncResponse {
    pub const fn new(should_transfer: bool, should_sync_acl: bool) -> Self {
        Self {
            should_transfer,
            should_sync_acl,
        }
    }

    pub const fn should_transfer(&self) -> bool {
        self.should_transfer
    }

    pub const fn should_sync_acl(&self) -> bool {
        self.should_sync_acl
    }

    /// 是否需要任何操作
    pub const fn is_required(&self) -> bool {
        self.should_transfer || self.should_sync_acl
    }
}

impl From<SyncResponse> for bool {
    fn from(response: SyncResponse) -> bool {
        response.is_required()
    }
}

/// 可选的同步策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// 大小或修改时间不同则传输（默认）
    SizeAndLastModified,
    /// 仅比较大小
    SizeOnly,
    /// 下载时要求时间戳完全一致
    ExactTimestamps,
    /// 从不操作
    Never,
    /// 目标缺失时总是传输
    MissingFile,
    /// 源缺失时删除目标文件
    Delete,
}

const SIZE_ONLY_ARG: ArgumentSpec = ArgumentSpec::store_true(
    "size-only",
    "Makes the size of each key the only criteria used to decide whether \
     to sync from source to destination.",
);

const EXACT_TIMESTAMPS_ARG: ArgumentSpec = ArgumentSpec::store_true(
    "exact-timestamps",
    "When syncing from S3 to local, same-sized items will be ignored only \
     when the timestamps match exactly. The default behavior is to ignore \
     same-sized items unless the local version is newer than the S3 version.",
);

const DELETE_ARG: ArgumentSpec = ArgumentSpec::store_true(
    "delete",
    "Files that exist in the destination but not in the source are deleted \
     during sync.",
);

impl SyncPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            SyncPolicy::SizeAndLastModified => "size_and_last_modified",
            SyncPolicy::SizeOnly => "size_only",
            SyncPolicy::ExactTimestamps => "exact_timestamps",
            SyncPolicy::Never => "never",
            SyncPolicy::MissingFile => "missing_file",
            SyncPolicy::Delete => "delete",
        }
    }

    /// 策略默认绑定的同步类型
    pub fn default_sync_type(&self) -> SyncType {
        match self {
            SyncPolicy::SizeAndLastModified | SyncPolicy::SizeOnly | SyncPolicy::ExactTimestamps => {
                SyncType::FileAtSrcAndDest
            }
            SyncPolicy::MissingFile => SyncType::FileNotAtDest,
            SyncPolicy::Never | SyncPolicy::Delete => SyncType::FileNotAtSrc,
        }
    }

    /// 策略对应的命令行参数，默认策略没有参数
    pub fn argument(&self) -> Option<ArgumentSpec> {
        match self {
            SyncPolicy::SizeOnly => Some(SIZE_ONLY_ARG),
            SyncPolicy::ExactTimestamps => Some(EXACT_TIMESTAMPS_ARG),
            SyncPolicy::Delete => Some(DELETE_ARG),
            SyncPolicy::SizeAndLastModified | SyncPolicy::Never | SyncPolicy::MissingFile => None,
        }
    }

    fn determine(
        &self,
        src: Option<&FileStat>,
        dest: Option<&FileStat>,
        include_acl: bool,
    ) -> Result<SyncResponse> {
        match self {
            SyncPolicy::SizeAndLastModified => {
                let (src, dest) = self.both(src, dest)?;
                Ok(size_and_time(src, dest, include_acl, compare_time))
            }
            SyncPolicy::ExactTimestamps => {
                let (src, dest) = self.both(src, dest)?;
                Ok(size_and_time(src, dest, include_acl, compare_time_exact))
            }
            SyncPolicy::SizeOnly => {
                let (src, dest) = self.both(src, dest)?;
                let should_transfer = !compare_size(src, dest);
                if should_transfer {
                    debug!(
                        "同步: {} -> {}, 大小: {} -> {}",
                        src.src_path, src.dest_path, src.size, dest.size
                    );
                }
                Ok(SyncResponse::new(
                    should_transfer,
                    include_acl && !compare_acl(src, dest),
                ))
            }
            SyncPolicy::Never => Ok(SyncResponse::new(false, false)),
            SyncPolicy::MissingFile => {
                if let Some(file) = src.or(dest) {
                    debug!(
                        "同步: {} -> {}, 目标文件不存在",
                        file.src_path, file.dest_path
                    );
                }
                Ok(SyncResponse::new(true, include_acl))
            }
            SyncPolicy::Delete => {
                if let Some(file) = dest.or(src) {
                    debug!(
                        "同步: (无) -> {} (删除), 源文件不存在 ({}) 且已启用删除",
                        file.src_path, file.dest_path
                    );
                }
                Ok(SyncResponse::new(true, false))
            }
        }
    }

    fn both<'a>(
        &self,
        src: Option<&'a FileStat>,
        dest: Option<&'a FileStat>,
    ) -> Result<(&'a FileStat, &'a FileStat)> {
        match (src, dest) {
            (Some(src), Some(dest)) => Ok((src, dest)),
            (Some(file), None) | (None, Some(file)) => Err(StrategyError::MissingCounterpart {
                strategy: self.name(),
                path: file.src_path.clone(),
            }),
            (None, None) => Err(StrategyError::NoFiles),
        }
    }
}

fn size_and_time(
    src: &FileStat,
    dest: &FileStat,
    include_acl: bool,
    time_check: fn(&FileStat, &FileStat) -> bool,
) -> SyncResponse {
    let same_size = compare_size(src, dest);
    let same_last_modified = time_check(src, dest);
    let should_transfer = !same_size || !same_last_modified;

    if should_transfer {
        debug!(
            "同步: {} -> {}, 大小: {} -> {}, 修改时间: {} -> {}",
            src.src_path,
            src.dest_path,
            src.size,
            dest.size,
            src.last_modified,
            dest.last_modified
        );
    }

    let should_sync_acl = include_acl && !compare_acl(src, dest);
    SyncResponse::new(should_transfer, should_sync_acl)
}

/// 同步策略实例
///
/// 启动时构造一次，整个同步过程复用，不保存任何单个文件的状态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strategy {
    policy: SyncPolicy,
    sync_type: SyncType,
    argument: Option<ArgumentSpec>,
    include_acl: bool,
}

impl Strategy {
    /// 使用策略默认的同步类型
    pub fn new(policy: SyncPolicy) -> Self {
        Self::for_sync_type(policy, policy.default_sync_type())
    }

    pub fn for_sync_type(policy: SyncPolicy, sync_type: SyncType) -> Self {
        Self {
            policy,
            sync_type,
            argument: policy.argument(),
            include_acl: false,
        }
    }

    /// 从配置字符串构造，未知的同步类型返回配置错误
    pub fn with_sync_type(policy: SyncPolicy, sync_type: &str) -> Result<Self> {
        Ok(Self::for_sync_type(policy, sync_type.parse()?))
    }

    pub fn with_acl(mut self, include_acl: bool) -> Self {
        self.include_acl = include_acl;
        self
    }

    /// 替换策略的命令行参数
    pub fn with_argument(mut self, argument: Option<ArgumentSpec>) -> Self {
        self.argument = argument;
        self
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    pub fn name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn sync_type(&self) -> SyncType {
        self.sync_type
    }

    pub fn include_acl(&self) -> bool {
        self.include_acl
    }

    pub fn argument(&self) -> Option<&ArgumentSpec> {
        self.argument.as_ref()
    }

    pub fn arg_name(&self) -> Option<&'static str> {
        self.argument.map(|arg| arg.name)
    }

    pub fn arg_dest(&self) -> Option<&'static str> {
        self.argument.and_then(|arg| arg.dest)
    }

    /// 判断是否需要同步
    ///
    /// 一侧文件不存在时传 `None`；两侧都为 `None` 是调用方错误。
    pub fn determine_should_sync(
        &self,
        src: Option<&FileStat>,
        dest: Option<&FileStat>,
    ) -> Result<SyncResponse> {
        if src.is_none() && dest.is_none() {
            return Err(StrategyError::NoFiles);
        }
        self.policy.determine(src, dest, self.include_acl)
    }

    /// 把策略注册到会话
    pub fn register_strategy<S: StrategySession + ?Sized>(self, session: &mut S) {
        session.register(self);
    }
}

/// 外部注册中心在固定时机调用的两个钩子
pub trait StrategyHooks {
    /// 构建参数表时调用
    fn add_sync_argument(&self, arg_table: &mut ArgumentTable);

    /// 选择策略时调用，参数被设置时返回自身
    fn use_sync_strategy(&self, params: &CliParams) -> Option<&Strategy>;
}

impl StrategyHooks for Strategy {
    fn add_sync_argument(&self, arg_table: &mut ArgumentTable) {
        if let Some(arg) = self.argument {
            arg_table.push(arg);
        }
    }

    fn use_sync_strategy(&self, params: &CliParams) -> Option<&Strategy> {
        let key = self.argument.as_ref()?.param_key();
        params.is_set(&key).then_some(self)
    }
}

/// 接收策略注册的会话
pub trait StrategySession {
    fn register(&mut self, strategy: Strategy);
}
