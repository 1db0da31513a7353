//! Tracing setup.
//!
//! One-shot commands log warnings to stderr so they don't interleave with
//! rendered output. `run` logs at info level to stderr and to a daily log
//! file in the data directory. `RUST_LOG` overrides either default.

use anyhow::Result;
use holiday_core::paths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const CLI_FILTER: &str = "holiday_notifier=warn,holiday_core=warn";
const DAEMON_FILTER: &str = "holiday_notifier=info,holiday_core=info";
const LOG_FILE_PREFIX: &str = "holiday_notifier.log";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

pub fn init_cli() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(CLI_FILTER))
        .with_writer(std::io::stderr)
        .init();
}

/// Returns a guard that must be held for the lifetime of the process so
/// buffered log lines are flushed.
pub fn init_daemon() -> Result<WorkerGuard> {
    let log_dir = paths::data_dir()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter(DAEMON_FILTER))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    tracing::info!(dir = %log_dir.display(), "logging to file");
    Ok(guard)
}
