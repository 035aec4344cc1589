//! Diagnostic logging setup.
//!
//! All failure visibility in this crate is via `tracing` diagnostics; no
//! error is surfaced through UI text. This module wires the subscriber:
//! stderr by default, or a non-blocking daily-rolled file when a log
//! directory is configured. The `RUST_LOG` environment variable overrides
//! the configured filter.

use std::path::PathBuf;

use time::format_description::well_known::Rfc3339;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is not set.
    pub filter: String,
    /// Log to daily-rolled files in this directory instead of stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            log_dir: None,
        }
    }
}

/// Install the global tracing subscriber.
///
/// Returns the worker guard when file logging is active; the caller must
/// keep it alive for the process lifetime or buffered lines are lost.
/// Subsequent calls are no-ops (the first subscriber wins), which keeps
/// test processes safe.
pub fn init(config: &LogConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter.clone()));

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "tilepack.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_timer(LocalTime::new(Rfc3339))
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
                .ok();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_timer(LocalTime::new(Rfc3339))
                .with_writer(std::io::stderr)
                .try_init()
                .ok();
            None
        }
    }
}
