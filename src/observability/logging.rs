//! Structured logging.
//!
//! Console output plus a durable append-only file sink. The file is written
//! through `tracing_appender::non_blocking`: events are queued and a worker
//! thread does the I/O, so a slow disk never holds up a response. When the
//! queue is full, events are dropped instead of blocking.

use std::fs::OpenOptions;
use std::path::Path;
use thiserror::Error;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::config::ObservabilityConfig;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file {path}: {source}")]
    OpenFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to install tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Keeps the file writer alive; pending lines are flushed on drop.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `config.log_level`.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<LogGuard, LoggingError> {
    let (subscriber, guard) = build_subscriber(config)?;
    subscriber.try_init()?;
    Ok(guard)
}

/// Console plus optional file subscriber, not yet installed.
pub fn build_subscriber(
    config: &ObservabilityConfig,
) -> Result<(impl Subscriber + Send + Sync + 'static, LogGuard), LoggingError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config.log_level.trim().is_empty() {
            EnvFilter::new("info")
        } else {
            EnvFilter::new(&config.log_level)
        }
    });

    let (file_layer, guard) = match config.error_log_path.as_deref() {
        Some(path) => {
            let file = open_append(Path::new(path))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let level = config
                .file_log_level
                .parse::<LevelFilter>()
                .unwrap_or(LevelFilter::INFO);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer)
                .with_filter(level);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer);

    Ok((subscriber, LogGuard { _file: guard }))
}

fn open_append(path: &Path) -> Result<std::fs::File, LoggingError> {
    let open_err = |source| LoggingError::OpenFile {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(open_err)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(open_err)
}

/// Render an error and all of its sources as `outer: inner: root`.
pub fn display_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        // thiserror messages often embed their source already.
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("outer failed")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn test_display_chain_includes_sources() {
        let err = Outer(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"));
        assert_eq!(display_chain(&err), "outer failed: disk gone");
    }

    #[test]
    fn test_open_append_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("error.log");
        open_append(&path).unwrap();
        assert!(path.exists());
    }
}
