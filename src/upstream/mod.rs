//! Upstream generative-language API.
//!
//! # Data Flow
//! ```text
//! handler payload {contents, systemInstruction}
//!     → client.rs (POST <url>?key=<credential>, per-call deadline)
//!     → 2xx: parsed JSON returned as-is
//!     → anything else: UpstreamError (logged, never forwarded)
//! ```

pub mod client;
pub mod payload;

pub use client::{UpstreamClient, UpstreamError};
pub use payload::{candidate_text, ChatPayload};
