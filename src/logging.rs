//! 日志初始化
//!
//! 同时输出到 stderr 和本地日志文件。日志级别通过 RUST_LOG 控制，例如：
//! `RUST_LOG=homework_status_bot=info homework-bot`

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// 默认日志文件名（位于工作目录）
pub const DEFAULT_LOG_FILE: &str = "homework_bot.log";

/// 未设置 RUST_LOG 时的过滤规则
pub const DEFAULT_FILTER: &str = "homework_status_bot=debug,homework_bot=debug";

/// 默认日志文件路径
pub fn default_log_path() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

/// 打开日志文件（每次启动清空）
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create log directory {}", parent.display()))?;
    }

    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("Cannot open log file {}", path.display()))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// 初始化全局 tracing subscriber
///
/// `log_file` 为 None 时只输出到 stderr。
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_line_number(true),
            )
        }
        None => None,
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_line_number(true)
        .with_thread_ids(false);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Cannot initialize logging: {}", e))
}
