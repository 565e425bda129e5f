use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use synctools_strategy::core::{
    register_sync_strategies, ActionSummary, CliParams, FileStat, StrategyRegistry, SyncAction,
    SyncPlanner,
};
use synctools_strategy::logging::{self, get_data_dir, LogConfig};
use synctools_strategy::SyncOptions;

/// 计划请求：两侧文件表（键为相对路径）和可选的参数
#[derive(Debug, Deserialize)]
struct PlanRequest {
    /// 未提供时使用 config.json 中的同步选项
    #[serde(default)]
    params: Option<CliParams>,
    #[serde(default)]
    source: HashMap<String, FileStat>,
    #[serde(default)]
    dest: HashMap<String, FileStat>,
}

#[derive(Debug, Serialize)]
struct PlanOutput<'a> {
    actions: &'a [SyncAction],
    summary: ActionSummary,
}

/// 初始化日志系统，标准输出留给计划结果
fn init_logging(data_dir: &std::path::Path) {
    let config = LogConfig::load(data_dir);

    match logging::file_subscriber(&config, data_dir) {
        Ok(subscriber) => {
            let _ = tracing::subscriber::set_global_default(subscriber);
        }
        Err(e) => {
            // 文件日志创建失败，回退到控制台
            let _ = tracing::subscriber::set_global_default(logging::console_subscriber(&config));
            tracing::warn!("无法创建日志文件，仅输出到控制台: {}", e);
        }
    }
}

fn read_request() -> Result<PlanRequest> {
    let input = match std::env::args().nth(1) {
        Some(path) if path != "-" => std::fs::read_to_string(&path)
            .with_context(|| format!("无法读取计划请求: {}", path))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("无法从标准输入读取计划请求")?;
            buf
        }
    };

    serde_json::from_str(&input).context("计划请求格式错误")
}

fn main() -> Result<()> {
    let data_dir = get_data_dir();
    init_logging(&data_dir);

    let options = SyncOptions::load(&data_dir);
    let request = read_request()?;
    let params = request.params.unwrap_or_else(|| options.to_params());

    let mut registry = StrategyRegistry::new(options.include_acl);
    register_sync_strategies(&mut registry);
    let planner = SyncPlanner::new(registry.select(&params)?);

    let actions = planner.plan(&request.source, &request.dest)?;
    let output = PlanOutput {
        summary: SyncPlanner::summarize_actions(&actions),
        actions: &actions,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
