//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (CORS preflight, nosniff on the way out)
//!     → limits.rs (request body size)
//!     → origin.rs (origin gate, 403 on rejection)
//!     → Pass to the endpoint handler
//! ```
//!
//! # Design Decisions
//! - Fail closed: a declared origin that matches no rule is rejected
//! - A missing origin is accepted (curl, server-to-server callers)
//! - The policy is immutable after startup

pub mod headers;
pub mod limits;
pub mod origin;

pub use origin::{OriginDecision, OriginPolicy};
