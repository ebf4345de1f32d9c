//! Rotating log system
//!
//! Logs to both console and rotating files in ./logs/

use anyhow::Context;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system with rotating file logs
pub fn init_logging(log_dir: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir))?;

    // Rotates daily: treemap_viewer.log.YYYY-MM-DD
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "treemap_viewer.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Logging lasts the whole program
    std::mem::forget(guard);

    // Default to INFO, can be overridden with RUST_LOG
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,treemap_viewer=debug,tower_http=debug"));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!("Logging initialized. Log directory: {}", log_dir);
    Ok(())
}
