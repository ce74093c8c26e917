//! Origin-gated chat proxy for a generative-language API, plus the retrying
//! client that talks to it.

pub mod client;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;
pub mod upstream;

pub use client::{BackoffClient, ChatSession};
pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
