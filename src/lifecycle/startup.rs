//! Startup orchestration.
//!
//! Config is loaded and validated first, then logging, then the server state,
//! and the listener binds last so traffic only arrives once everything is
//! ready. Any failure here is fatal.

use std::path::Path;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::validation::ValidationError;
use crate::config::{load_startup_config, ConfigError, ProxyConfig};
use crate::http::HttpServer;
use crate::observability::logging::{init_tracing, LogGuard, LoggingError};
use crate::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("logging setup failed: {0}")]
    Logging(#[from] LoggingError),
    #[error("upstream client setup failed: {0}")]
    Upstream(#[from] UpstreamError),
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

impl StartupError {
    /// The process was started without the upstream credential.
    pub fn is_missing_credential(&self) -> bool {
        match self {
            StartupError::Config(e) => e.is_missing_credential(),
            StartupError::Upstream(UpstreamError::MissingCredential) => true,
            _ => false,
        }
    }

    /// Line printed to stderr before exiting.
    pub fn fatal_message(&self) -> String {
        if self.is_missing_credential() {
            ValidationError::MissingApiKey.to_string()
        } else {
            self.to_string()
        }
    }
}

/// Load configuration and install logging.
///
/// The returned guard must live as long as the process so buffered log
/// lines reach the file.
pub fn configure(path: Option<&Path>) -> Result<(ProxyConfig, LogGuard), StartupError> {
    let config = load_startup_config(path)?;
    let guard = init_tracing(&config.observability)?;
    Ok((config, guard))
}

/// Build the server and bind its listener.
pub async fn prepare(config: ProxyConfig) -> Result<(HttpServer, TcpListener), StartupError> {
    let address = config.listener.bind_address();

    tracing::info!(
        bind_address = %address,
        allowed_origins = config.security.allowed_origins.len(),
        upstream_timeout_secs = config.timeouts.upstream_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    Ok((server, listener))
}
