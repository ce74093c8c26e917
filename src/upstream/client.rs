//! Client for the upstream generative-language API.
//!
//! One POST per call, no retries. The credential travels only in the query
//! string of the outbound URL and is stripped from every error this module
//! returns.

use std::time::Duration;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::resilience::{with_deadline, TimedOut};
use crate::upstream::payload::ChatPayload;

/// Failure talking to the upstream API. Never shown to proxy callers.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream credential is not configured")]
    MissingCredential,
    #[error("invalid upstream url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("API request failed with status {0}")]
    Status(StatusCode),
    #[error("upstream returned an unreadable body: {0}")]
    Decode(#[source] reqwest::Error),
    #[error(transparent)]
    Timeout(#[from] TimedOut),
}

impl UpstreamError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::MissingCredential | UpstreamError::InvalidUrl(_) | UpstreamError::Client(_) => "config",
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Status(_) => "status",
            UpstreamError::Decode(_) => "decode",
            UpstreamError::Timeout(_) => "timeout",
        }
    }
}

/// Forwards payloads to the single configured upstream endpoint.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig, timeouts: &TimeoutConfig) -> Result<Self, UpstreamError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(UpstreamError::MissingCredential)?;

        let mut endpoint = Url::parse(&config.url)?;
        endpoint.query_pairs_mut().append_pair("key", api_key);

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(UpstreamError::Client)?;

        Ok(Self {
            http,
            endpoint,
            timeout: Duration::from_secs(timeouts.upstream_secs),
        })
    }

    /// POST `payload` upstream and return its JSON body.
    ///
    /// A non-success status is an error and the body is discarded unread.
    pub async fn generate(&self, payload: &ChatPayload) -> Result<Value, UpstreamError> {
        with_deadline(self.timeout, async {
            let response = self
                .http
                .post(self.endpoint.clone())
                .json(payload)
                .send()
                .await
                .map_err(|e| UpstreamError::Transport(e.without_url()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(UpstreamError::Status(status));
            }

            response
                .json::<Value>()
                .await
                .map_err(|e| UpstreamError::Decode(e.without_url()))
        })
        .await
    }

    /// Endpoint without its query string, for logs.
    pub fn redacted_endpoint(&self) -> String {
        let mut url = self.endpoint.clone();
        url.set_query(None);
        url.to_string()
    }
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("endpoint", &self.redacted_endpoint())
            .field("timeout", &self.timeout)
            .finish()
    }
}
