//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound call:
//!     → timeouts.rs (per-attempt deadline)
//!     → On failure: retries.rs (wait, then try again)
//!     → backoff.rs (delay grows by 1.6 + jitter each wait)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Retries happen on the calling side only; the proxy never retries
//! - Backoff delays carry jitter

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use backoff::{Backoff, BackoffConfig};
pub use retries::{retry_with_backoff, RetryPolicy, DEFAULT_MAX_RETRIES};
pub use timeouts::{with_deadline, TimedOut};
