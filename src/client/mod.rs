//! Caller side of the proxy.
//!
//! # Data Flow
//! ```text
//! UI text
//!     → sanitize.rs (strip script/iframe/handlers)
//!     → session.rs (append turn, build {contents, systemInstruction})
//!     → backoff_client.rs (POST, retry with backoff, per-attempt deadline)
//!     → session.rs (extract candidate text, append model turn)
//! ```

pub mod backoff_client;
pub mod sanitize;
pub mod session;

pub use backoff_client::{BackoffClient, ClientError, DEFAULT_ATTEMPT_TIMEOUT};
pub use sanitize::sanitize_input;
pub use session::{endpoint_url, friendly_message, ChatSession, ChatTurn, Role, DEFAULT_API_BASE};
