pub mod acl;
pub mod argument;
pub mod comparator;
pub mod file_stat;
pub mod params;
pub mod plan;
pub mod registry;
pub mod strategy;

pub use acl::{separate_owner_grants, AclData, Grant, Grantee, Owner};
pub use argument::{ArgAction, ArgumentSpec, ArgumentTable};
pub use comparator::{compare_acl, compare_size, compare_time, compare_time_exact};
pub use file_stat::{FileStat, OperationKind};
pub use params::CliParams;
pub use plan::{ActionSummary, SyncAction, SyncPlanner};
pub use registry::{register_sync_strategies, SelectedStrategies, StrategyRegistry};
pub use strategy::{
    Strategy, StrategyHooks, StrategySession, SyncPolicy, SyncResponse, SyncType,
};
