//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and middleware produce:
//!     → logging.rs (console + append-only file, non-blocking)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout and error.log
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a request
//! - Log file I/O happens off the request path
//! - Metrics are atomic increments

pub mod logging;
pub mod metrics;

pub use logging::{init_tracing, LogGuard};
