//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → optional TOML file (loader.rs)
//!     → environment overrides (GEMINI_API_KEY, PORT, ALLOWED_ORIGINS, ...)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; the allow-list never changes afterwards
//! - All fields have defaults to allow minimal configs
//! - A missing upstream credential is fatal

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_startup_config, ConfigError};
pub use schema::ProxyConfig;
pub use schema::ListenerConfig;
pub use schema::UpstreamConfig;
pub use schema::SecurityConfig;
pub use schema::TimeoutConfig;
pub use schema::ObservabilityConfig;
