//! 同步策略引擎
//!
//! 对源和目标两侧的每个文件，根据大小、修改时间和 ACL 判断是否需要传输内容、
//! 是否需要同步权限。文件列举和实际传输由调用方负责。

pub mod config;
pub mod core;
pub mod error;
pub mod logging;

pub use crate::core::{
    register_sync_strategies, ActionSummary, CliParams, FileStat, OperationKind,
    SelectedStrategies, Strategy, StrategyRegistry, SyncAction, SyncPlanner, SyncPolicy,
    SyncResponse, SyncType,
};
pub use config::SyncOptions;
pub use error::{Result, StrategyError};
