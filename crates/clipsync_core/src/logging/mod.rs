//! Logging infrastructure for clipsync.
//!
//! This module provides:
//! - Global `tracing` subscriber setup (stderr, optional rolling file)
//! - Per-run loggers recording phases, commands, and tool output
//! - Tail buffer for diagnosing external tool failures
//!
//! # Example
//!
//! ```no_run
//! use clipsync_core::logging::{RunLogger, LogConfig};
//!
//! let logger = RunLogger::new("wide_tight", "/path/to/logs", LogConfig::default(), None).unwrap();
//! logger.phase("Merge");
//! logger.command("ffmpeg -y -ss 0:00:01.000 -i 00001.MTS ...");
//! logger.success("Run completed");
//! ```

mod run_logger;
mod types;

use std::path::Path;

pub use run_logger::{default_run_name, RunLogger};
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing subscriber writing to stderr.
///
/// Respects `RUST_LOG`, falling back to `default_level`. Should be called
/// once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .try_init();
}

/// Initialize tracing to stderr plus a daily rolling file in `logs_dir`.
///
/// The returned guard must be held for the life of the program; dropping it
/// flushes and stops the file writer. Returns `None` if the logs directory
/// cannot be created, in which case only stderr logging is set up.
pub fn init_tracing_with_file(default_level: LogLevel, logs_dir: &Path) -> Option<WorkerGuard> {
    if let Err(e) = std::fs::create_dir_all(logs_dir) {
        eprintln!(
            "Warning: cannot create logs folder {}: {}",
            logs_dir.display(),
            e
        );
        init_tracing(default_level);
        return None;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    let appender = tracing_appender::rolling::daily(logs_dir, "clipsync.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(filter)
        .try_init();

    Some(guard)
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
