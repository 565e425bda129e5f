//! 日志模块 - 决策日志写入文件并按大小轮转

use crate::config::{read_section, write_section, CONFIG_FILE};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "sync-plan.log";

/// 可设为全局默认的 subscriber
pub type BoxedSubscriber = Box<dyn tracing::Subscriber + Send + Sync>;

/// 日志配置，保存在 config.json 的 `log` 节
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// 单个日志文件上限（MB）
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u32,
    /// "error" / "warn" / "info" / "debug" / "trace"
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_enabled() -> bool {
    true
}

fn default_max_size_mb() -> u32 {
    5
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_size_mb: default_max_size_mb(),
            level: default_level(),
        }
    }
}

impl LogConfig {
    pub fn load(config_dir: &Path) -> Self {
        read_section(config_dir, "log").unwrap_or_default()
    }

    pub fn save(&self, config_dir: &Path) -> anyhow::Result<()> {
        write_section(config_dir, "log", self)
    }

    /// 配置的日志级别，无法识别时为 INFO
    pub fn tracing_level(&self) -> tracing::Level {
        match self.level.to_lowercase().as_str() {
            "error" => tracing::Level::ERROR,
            "warn" => tracing::Level::WARN,
            "debug" => tracing::Level::DEBUG,
            "trace" => tracing::Level::TRACE,
            _ => tracing::Level::INFO,
        }
    }
}

type SharedWriter = Arc<Mutex<Option<BufWriter<File>>>>;

fn lock(writer: &SharedWriter) -> MutexGuard<'_, Option<BufWriter<File>>> {
    writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 带大小限制的日志写入器，超过上限时把当前文件改名为 `.old`
#[derive(Clone)]
pub struct SizeRotatingWriter {
    file_path: PathBuf,
    max_size: u64,
    writer: SharedWriter,
}

impl SizeRotatingWriter {
    pub fn new(log_dir: &Path, max_size_mb: u32) -> io::Result<Self> {
        fs::create_dir_all(log_dir)?;

        let file_path = log_dir.join(LOG_FILE);
        let max_size = u64::from(max_size_mb) * 1024 * 1024;
        let writer = Self::open_file(&file_path, max_size)?;

        Ok(Self {
            file_path,
            max_size,
            writer: Arc::new(Mutex::new(Some(writer))),
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn open_file(file_path: &Path, max_size: u64) -> io::Result<BufWriter<File>> {
        if Self::exceeds(file_path, max_size) {
            Self::rotate_log(file_path)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;

        Ok(BufWriter::new(file))
    }

    fn exceeds(file_path: &Path, max_size: u64) -> bool {
        fs::metadata(file_path)
            .map(|m| m.len() > max_size)
            .unwrap_or(false)
    }

    fn rotate_log(file_path: &Path) -> io::Result<()> {
        let backup_path = file_path.with_extension("log.old");
        if backup_path.exists() {
            fs::remove_file(&backup_path)?;
        }
        fs::rename(file_path, &backup_path)
    }

    /// 关闭当前文件、轮转并重新打开
    fn rotate_locked(
        guard: &mut MutexGuard<'_, Option<BufWriter<File>>>,
        file_path: &Path,
        max_size: u64,
    ) -> io::Result<()> {
        if let Some(mut w) = guard.take() {
            let _ = w.flush();
        }
        Self::rotate_log(file_path)?;
        **guard = Some(Self::open_file(file_path, max_size)?);
        Ok(())
    }
}

/// 单次写入使用的句柄
pub struct LogWriter {
    inner: SharedWriter,
    file_path: PathBuf,
    max_size: u64,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = lock(&self.inner);
        let writer = guard
            .as_mut()
            .ok_or_else(|| io::Error::other("log writer not available"))?;

        let written = writer.write(buf)?;
        writer.flush()?;

        if SizeRotatingWriter::exceeds(&self.file_path, self.max_size) {
            SizeRotatingWriter::rotate_locked(&mut guard, &self.file_path, self.max_size)?;
        }

        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        match lock(&self.inner).as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for SizeRotatingWriter {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            inner: self.writer.clone(),
            file_path: self.file_path.clone(),
            max_size: self.max_size,
        }
    }
}

fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(config.tracing_level().into())
}

fn console_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
}

/// 按配置构建写入 `log_dir` 的 subscriber；debug 构建同时输出到标准错误
///
/// 日志禁用时返回空的 registry。日志文件无法创建时返回错误，
/// 调用方可改用 [`console_subscriber`]。
pub fn file_subscriber(config: &LogConfig, log_dir: &Path) -> io::Result<BoxedSubscriber> {
    if !config.enabled {
        return Ok(Box::new(tracing_subscriber::registry()));
    }

    let file_writer = SizeRotatingWriter::new(log_dir, config.max_size_mb)?;
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(false);

    #[cfg(debug_assertions)]
    let subscriber = tracing_subscriber::registry()
        .with(env_filter(config))
        .with(file_layer)
        .with(console_layer());

    #[cfg(not(debug_assertions))]
    let subscriber = tracing_subscriber::registry()
        .with(env_filter(config))
        .with(file_layer);

    Ok(Box::new(subscriber))
}

/// 只输出到标准错误的 subscriber，标准输出留给计划结果
pub fn console_subscriber(config: &LogConfig) -> BoxedSubscriber {
    Box::new(
        tracing_subscriber::registry()
            .with(env_filter(config))
            .with(console_layer()),
    )
}

/// 数据目录：默认 `<config_dir>/synctools`，可由 config.json 的 `data_path` 覆盖
pub fn get_data_dir() -> PathBuf {
    let default_dir = dirs::config_dir()
        .map(|p| p.join("synctools"))
        .unwrap_or_else(|| PathBuf::from(".synctools"));

    fs::read_to_string(default_dir.join(CONFIG_FILE))
        .ok()
        .and_then(|content| serde_json::from_str::<serde_json::Value>(&content).ok())
        .and_then(|config| config.get("data_path")?.as_str().map(PathBuf::from))
        .filter(|p| p.is_dir())
        .unwrap_or(default_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_level() {
        let mut config = LogConfig::default();
        assert_eq!(config.tracing_level(), tracing::Level::INFO);
        config.level = "DEBUG".to_string();
        assert_eq!(config.tracing_level(), tracing::Level::DEBUG);
        config.level = "verbose".to_string();
        assert_eq!(config.tracing_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_log_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            enabled: false,
            max_size_mb: 1,
            level: "warn".to_string(),
        };
        config.save(dir.path()).unwrap();
        assert_eq!(LogConfig::load(dir.path()), config);
    }

    #[test]
    fn test_writer_rotates_when_too_large() {
        let dir = tempfile::tempdir().unwrap();
        // 上限 0MB：任何写入都会触发轮转
        let writer = SizeRotatingWriter::new(dir.path(), 0).unwrap();

        let mut handle = writer.make_writer();
        handle.write_all(b"first line\n").unwrap();
        handle.write_all(b"second line\n").unwrap();

        let backup = dir.path().join("sync-plan.log.old");
        assert!(backup.exists());
        assert_eq!(fs::read_to_string(backup).unwrap(), "second line\n");
        assert!(writer.file_path().exists());
    }

    #[test]
    fn test_writer_appends_below_limit() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SizeRotatingWriter::new(dir.path(), 5).unwrap();

        writer.make_writer().write_all(b"a\n").unwrap();
        writer.make_writer().write_all(b"b\n").unwrap();

        assert_eq!(fs::read_to_string(writer.file_path()).unwrap(), "a\nb\n");
        assert!(!dir.path().join("sync-plan.log.old").exists());
    }

    #[test]
    fn test_file_subscriber_writes_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig::default();

        let subscriber = file_subscriber(&config, dir.path()).unwrap();
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("计划完成");
        });

        let content = fs::read_to_string(dir.path().join(LOG_FILE)).unwrap();
        assert!(content.contains("计划完成"));
    }

    #[test]
    fn test_file_subscriber_disabled_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            enabled: false,
            ..LogConfig::default()
        };

        let subscriber = file_subscriber(&config, dir.path()).unwrap();
        tracing::subscriber::with_default(subscriber, || tracing::info!("不应写入"));

        assert!(!dir.path().join(LOG_FILE).exists());
    }

    #[test]
    fn test_console_fallback_when_log_dir_unusable() {
        let dir = tempfile::tempdir().unwrap();
        // 普通文件无法作为日志目录
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"").unwrap();

        let config = LogConfig::default();
        assert!(file_subscriber(&config, &blocker).is_err());

        let subscriber = console_subscriber(&config);
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("无法创建日志文件，仅输出到控制台");
        });
    }
}
