//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID)
//!     → security::origin (origin gate)
//!     → endpoints.rs (forward to upstream)
//!     → response.rs (generic error mapping)
//!     → Send to client
//! ```

pub mod endpoints;
pub mod request;
pub mod response;
pub mod server;

pub use endpoints::Endpoint;
pub use request::X_REQUEST_ID;
pub use response::ProxyError;
pub use server::{AppState, HttpServer};
