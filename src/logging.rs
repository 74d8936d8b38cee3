//! # 日志初始化
//!
//! 基于 `tracing-subscriber` 的全局日志：
//! - stderr 输出，`-v` 次数决定级别 (WARN → INFO → DEBUG → TRACE)
//! - `-q` 关闭全部日志
//! - 可选 `--log-file` 额外写入无颜色的文件
//!
//! 用户可见的结果仍由 `utils/output.rs` 打印到 stdout。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用

use crate::error::{NucradError, Result};

use std::fs::File;
use std::path::Path;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

/// 由 verbosity 和 quiet 决定日志级别
pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::OFF;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// 安装全局 subscriber
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact();

    let subscriber = tracing_subscriber::registry()
        .with(level_filter(verbosity, quiet))
        .with(stderr_layer);

    let installed = if let Some(path) = log_file {
        let file = File::create(path).map_err(|e| NucradError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true)
            .with_target(true);

        subscriber.with(file_layer).try_init()
    } else {
        subscriber.try_init()
    };

    installed.map_err(|e| NucradError::Other(format!("Failed to initialise logging: {}", e)))
}
