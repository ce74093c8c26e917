//! Retry logic.
//!
//! # Responsibilities
//! - Run an operation up to `max_retries + 1` times
//! - Sleep with exponential backoff + jitter between attempts
//! - Surface the last failure unchanged once attempts are exhausted
//!
//! # Design Decisions
//! - Every failure is retryable here; classification belongs to the caller's
//!   error type, not to this loop
//! - The sleep suspends only the calling task
//! - Retry state lives on the stack of one call and is dropped with it
//! - Nothing is logged here; the caller reports the outcome

use std::future::Future;

use crate::resilience::backoff::{Backoff, BackoffConfig};

/// Default number of retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts are `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: BackoffConfig,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: BackoffConfig::default(),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Run `op` until it succeeds or the policy is exhausted.
///
/// `op` receives the zero-based attempt number.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut backoff = Backoff::new(&policy.backoff);
    let mut attempt = 0;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= policy.max_retries => return Err(err),
            Err(_) => {
                tokio::time::sleep(backoff.advance()).await;
                attempt += 1;
            }
        }
    }
}
