//! 策略注册与选择

use crate::core::argument::ArgumentTable;
use crate::core::params::CliParams;
use crate::core::strategy::{
    Strategy, StrategyHooks, StrategySession, SyncPolicy, SyncResponse, SyncType,
};
use crate::core::file_stat::FileStat;
use crate::error::{Result, StrategyError};
use tracing::{debug, info};

/// 注册由命令行参数启用的策略
pub fn register_sync_strategies<S: StrategySession + ?Sized>(session: &mut S) {
    Strategy::new(SyncPolicy::SizeOnly).register_strategy(session);
    Strategy::new(SyncPolicy::ExactTimestamps).register_strategy(session);
    Strategy::new(SyncPolicy::Delete).register_strategy(session);
}

/// 策略注册中心
///
/// `include_acl` 在注册时写入每个策略，之后不再变化。
#[derive(Debug, Clone, Default)]
pub struct StrategyRegistry {
    include_acl: bool,
    strategies: Vec<Strategy>,
}

impl StrategyRegistry {
    pub fn new(include_acl: bool) -> Self {
        Self {
            include_acl,
            strategies: Vec::new(),
        }
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// 收集所有策略的命令行参数
    pub fn argument_table(&self) -> ArgumentTable {
        let mut table = ArgumentTable::new();
        for strategy in &self.strategies {
            strategy.add_sync_argument(&mut table);
        }
        table
    }

    /// 为每种同步类型选出一个策略
    ///
    /// 没有策略被参数选中时使用默认策略，多个策略同时选中同一类型时报错。
    pub fn select(&self, params: &CliParams) -> Result<SelectedStrategies> {
        let mut selected = SelectedStrategies::defaults(self.include_acl);

        for sync_type in SyncType::ALL {
            let claimed: Vec<&Strategy> = self
                .strategies
                .iter()
                .filter(|s| s.sync_type() == sync_type)
                .filter_map(|s| s.use_sync_strategy(params))
                .collect();

            match claimed.as_slice() {
                [] => {}
                [strategy] => {
                    debug!("{} 使用策略: {}", sync_type, strategy.name());
                    selected.set(sync_type, (*strategy).clone())?;
                }
                many => {
                    return Err(StrategyError::AmbiguousStrategy {
                        sync_type,
                        strategies: many.iter().map(|s| s.name()).collect(),
                    });
                }
            }
        }

        info!(
            "已选择同步策略: {}={}, {}={}, {}={}",
            SyncType::FileAtSrcAndDest,
            selected.file_at_src_and_dest.name(),
            SyncType::FileNotAtDest,
            selected.file_not_at_dest.name(),
            SyncType::FileNotAtSrc,
            selected.file_not_at_src.name()
        );

        Ok(selected)
    }
}

impl StrategySession for StrategyRegistry {
    fn register(&mut self, strategy: Strategy) {
        debug!("注册同步策略: {} ({})", strategy.name(), strategy.sync_type());
        self.strategies.push(strategy.with_acl(self.include_acl));
    }
}

/// 每种同步类型各一个策略，槽位中的策略总是绑定到该同步类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedStrategies {
    file_at_src_and_dest: Strategy,
    file_not_at_dest: Strategy,
    file_not_at_src: Strategy,
}

impl SelectedStrategies {
    /// 默认组合：大小+时间 / 缺失即传输 / 从不删除
    pub fn defaults(include_acl: bool) -> Self {
        Self {
            file_at_src_and_dest: Strategy::new(SyncPolicy::SizeAndLastModified).with_acl(include_acl),
            file_not_at_dest: Strategy::new(SyncPolicy::MissingFile).with_acl(include_acl),
            file_not_at_src: Strategy::new(SyncPolicy::Never).with_acl(include_acl),
        }
    }

    pub fn get(&self, sync_type: SyncType) -> &Strategy {
        match sync_type {
            SyncType::FileAtSrcAndDest => &self.file_at_src_and_dest,
            SyncType::FileNotAtDest => &self.file_not_at_dest,
            SyncType::FileNotAtSrc => &self.file_not_at_src,
        }
    }

    /// 替换某个同步类型的策略，策略绑定的类型必须与槽位一致
    pub fn set(&mut self, sync_type: SyncType, strategy: Strategy) -> Result<()> {
        if strategy.sync_type() != sync_type {
            return Err(StrategyError::SyncTypeMismatch {
                strategy: strategy.name(),
                expected: sync_type,
                actual: strategy.sync_type(),
            });
        }

        let slot = match sync_type {
            SyncType::FileAtSrcAndDest => &mut self.file_at_src_and_dest,
            SyncType::FileNotAtDest => &mut self.file_not_at_dest,
            SyncType::FileNotAtSrc => &mut self.file_not_at_src,
        };
        *slot = strategy;
        Ok(())
    }

    /// 按文件对的同步类型分派到对应策略
    pub fn determine_should_sync(
        &self,
        src: Option<&FileStat>,
        dest: Option<&FileStat>,
    ) -> Result<SyncResponse> {
        let sync_type = SyncType::for_pair(src, dest).ok_or(StrategyError::NoFiles)?;
        self.get(sync_type).determine_should_sync(src, dest)
    }
}
