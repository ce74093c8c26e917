//! Timeout enforcement.
//!
//! Every outbound call (client attempt or upstream forward) runs under an
//! explicit deadline instead of relying on transport defaults.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// The wrapped operation did not finish before its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation timed out after {0:?}")]
pub struct TimedOut(pub Duration);

/// Run `fut` with a deadline of `limit`. Elapsed deadlines become `E` via
/// `From<TimedOut>`, so callers keep a single error type.
pub async fn with_deadline<F, T, E>(limit: Duration, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<TimedOut>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(TimedOut(limit).into()),
    }
}
