//! 同步策略错误类型

use crate::core::strategy::SyncType;

/// 同步策略操作的结果类型
pub type Result<T> = std::result::Result<T, StrategyError>;

/// 同步策略错误
#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    /// 未知的同步类型（构造时的配置错误）
    #[error("Unknown sync_type: {value}. Valid options are {valid}", valid = SyncType::valid_options())]
    InvalidSyncType { value: String },

    /// 未知的操作类型
    #[error("Unknown operation: {0}. Valid options are upload, download, copy")]
    InvalidOperation(String),

    /// 源文件和目标文件都不存在
    #[error("determine_should_sync called with neither a source nor a destination file")]
    NoFiles,

    /// 需要两边文件的策略只拿到了一边
    #[error("{strategy} needs the file at both source and destination: {path}")]
    MissingCounterpart { strategy: &'static str, path: String },

    /// 策略被放入不属于它的同步类型槽位
    #[error("{strategy} is bound to {actual} and cannot handle {expected}")]
    SyncTypeMismatch {
        strategy: &'static str,
        expected: SyncType,
        actual: SyncType,
    },

    /// 同一同步类型被多个策略选中
    #[error("Multiple sync strategies claim {sync_type}: {}", .strategies.join(", "))]
    AmbiguousStrategy {
        sync_type: SyncType,
        strategies: Vec<&'static str>,
    },
}
