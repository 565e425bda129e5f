//! 应用配置模块

use crate::core::params::CliParams;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub(crate) const CONFIG_FILE: &str = "config.json";

/// 同步选项，保存在 config.json 的 `sync` 节
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOptions {
    /// 是否比较并同步 ACL
    #[serde(default)]
    pub include_acl: bool,
    /// 只比较大小
    #[serde(default)]
    pub size_only: bool,
    /// 下载时要求时间戳完全一致
    #[serde(default)]
    pub exact_timestamps: bool,
    /// 删除目标中多余的文件
    #[serde(default)]
    pub delete: bool,
}

impl SyncOptions {
    /// 从配置文件加载，文件不存在或格式错误时使用默认值
    pub fn load(config_dir: &Path) -> Self {
        read_section(config_dir, "sync").unwrap_or_default()
    }

    /// 保存同步选项，保留配置文件中的其他节
    pub fn save(&self, config_dir: &Path) -> Result<()> {
        write_section(config_dir, "sync", self)
    }

    /// 转换为策略选择使用的参数
    pub fn to_params(&self) -> CliParams {
        CliParams::new()
            .with("size_only", self.size_only)
            .with("exact_timestamps", self.exact_timestamps)
            .with("delete", self.delete)
    }
}

/// 读取 config.json 中的某一节
pub(crate) fn read_section<T: for<'de> Deserialize<'de>>(config_dir: &Path, key: &str) -> Option<T> {
    let content = fs::read_to_string(config_dir.join(CONFIG_FILE)).ok()?;
    let config: serde_json::Value = serde_json::from_str(&content).ok()?;
    let section = config.get(key)?.clone();
    serde_json::from_value(section)
        .inspect_err(|e| tracing::warn!("配置节 {} 格式错误，使用默认值: {}", key, e))
        .ok()
}

/// 写入 config.json 中的某一节
pub(crate) fn write_section<T: Serialize>(config_dir: &Path, key: &str, value: &T) -> Result<()> {
    let config_file = config_dir.join(CONFIG_FILE);

    // 读取现有配置
    let mut config: serde_json::Value = if config_file.exists() {
        let content = fs::read_to_string(&config_file)
            .with_context(|| format!("读取配置文件失败: {}", config_file.display()))?;
        serde_json::from_str(&content).unwrap_or_else(|_| serde_json::json!({}))
    } else {
        serde_json::json!({})
    };

    if !config.is_object() {
        config = serde_json::json!({});
    }
    config[key] = serde_json::to_value(value)?;

    fs::create_dir_all(config_dir)?;
    fs::write(&config_file, serde_json::to_string_pretty(&config)?)
        .with_context(|| format!("写入配置文件失败: {}", config_file.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(SyncOptions::load(dir.path()), SyncOptions::default());
    }

    #[test]
    fn test_save_keeps_other_sections() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"data_path": "/somewhere", "log": {"level": "debug"}}"#,
        )
        .unwrap();

        let options = SyncOptions {
            include_acl: true,
            delete: true,
            ..Default::default()
        };
        options.save(dir.path()).unwrap();

        assert_eq!(SyncOptions::load(dir.path()), options);
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap()).unwrap();
        assert_eq!(raw["data_path"], "/somewhere");
        assert_eq!(raw["log"]["level"], "debug");
        assert_eq!(raw["sync"]["includeAcl"], true);
    }

    #[test]
    fn test_to_params() {
        let options = SyncOptions {
            size_only: true,
            ..Default::default()
        };
        let params = options.to_params();
        assert!(params.is_set("size_only"));
        assert!(!params.is_set("delete"));
        assert!(!params.is_set("exact_timestamps"));
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), r#"{"sync": {"delete": true}}"#).unwrap();
        let options = SyncOptions::load(dir.path());
        assert!(options.delete);
        assert!(!options.include_acl);
    }
}
