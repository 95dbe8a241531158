//! Structured logging setup.
//!
//! Events go to stderr (so JSON command output on stdout stays clean) in
//! either compact text or JSON lines. When a log file is configured, the
//! same events are also appended to it as JSON lines through a
//! non-blocking writer.
//!
//! `RUST_LOG` overrides the configured level when set.

use crate::config::{LogFormat, ResolvedConfig};
use crate::{Error, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Build the filter: `RUST_LOG` if set, else the configured level.
pub fn env_filter(default_level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_level)
            .map_err(|e| Error::Config(format!("invalid log level '{}': {}", default_level, e))),
    }
}

/// Install the global subscriber.
///
/// Returns the file writer's guard when file logging is enabled; keep it
/// alive until exit or buffered lines are lost.
pub fn init_logging(config: &ResolvedConfig) -> Result<Option<WorkerGuard>> {
    let filter = env_filter(&config.log_level.value)?;

    let (file_layer, guard) = match &config.log_file {
        Some(resolved) => {
            let (writer, guard) = file_writer(&resolved.value)?;
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let (text_layer, json_layer) = match config.log_format.value {
        LogFormat::Text => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .compact(),
            ),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text_layer)
        .with(json_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Other(format!("failed to install logger: {}", e)))?;

    Ok(guard)
}

fn file_writer(
    path: &Path,
) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::Config(format!("log-file is not a file path: {}", path.display())))?;
    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

/// Install a test-writer subscriber; safe to call from many tests.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_test_writer()
                .compact(),
        )
        .try_init();
}
