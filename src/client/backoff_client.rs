//! HTTP client that retries a JSON POST with exponential backoff.
//!
//! Any failure counts: connection errors, timeouts, non-success statuses and
//! unreadable bodies. 4xx and 5xx are treated alike; the error keeps the
//! status so callers can tell them apart afterwards.

use std::time::Duration;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::resilience::{retry_with_backoff, with_deadline, RetryPolicy, TimedOut};

/// Default deadline for one attempt.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure surfaced by [`BackoffClient`] after retries are exhausted.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("Failed to fetch: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Non-200 response: {0}")]
    Status(StatusCode),
    #[error("invalid JSON in response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error(transparent)]
    Timeout(#[from] TimedOut),
    #[error("No content in response")]
    NoContent,
}

impl ClientError {
    /// HTTP status of the final attempt, when one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status(status) => Some(*status),
            _ => None,
        }
    }

    /// Network-level failure (nothing usable came back).
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ClientError::Transport(_) | ClientError::Timeout(_))
    }
}

/// Retrying JSON-over-HTTP client.
#[derive(Debug, Clone)]
pub struct BackoffClient {
    http: reqwest::Client,
    policy: RetryPolicy,
    attempt_timeout: Duration,
}

impl BackoffClient {
    /// Client with the default policy: 5 retries, 500 ms initial delay.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_policy(RetryPolicy::default(), DEFAULT_ATTEMPT_TIMEOUT)
    }

    pub fn with_policy(policy: RetryPolicy, attempt_timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self { http, policy, attempt_timeout })
    }

    /// POST `payload` using the client's configured retry ceiling.
    pub async fn send<P>(&self, endpoint: &str, payload: &P) -> Result<Value, ClientError>
    where
        P: Serialize + ?Sized,
    {
        self.send_with_retry(endpoint, payload, self.policy.max_retries).await
    }

    /// POST `payload` to `endpoint`, making up to `max_retries + 1` attempts.
    ///
    /// Returns the first successful JSON body, or the last failure unchanged.
    pub async fn send_with_retry<P>(
        &self,
        endpoint: &str,
        payload: &P,
        max_retries: u32,
    ) -> Result<Value, ClientError>
    where
        P: Serialize + ?Sized,
    {
        let url = Url::parse(endpoint)?;
        let url = &url;
        let policy = self.policy.clone().with_max_retries(max_retries);

        retry_with_backoff(&policy, move |_attempt| self.attempt(url, payload)).await
    }

    async fn attempt<P>(&self, url: &Url, payload: &P) -> Result<Value, ClientError>
    where
        P: Serialize + ?Sized,
    {
        with_deadline(self.attempt_timeout, async {
            let response = self
                .http
                .post(url.clone())
                .json(payload)
                .send()
                .await
                .map_err(ClientError::Transport)?;

            let status = response.status();
            if !status.is_success() {
                return Err(ClientError::Status(status));
            }

            response.json::<Value>().await.map_err(ClientError::Decode)
        })
        .await
    }
}
