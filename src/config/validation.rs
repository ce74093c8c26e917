//! Configuration validation.
//!
//! Semantic checks only; serde handles syntax. Every problem is reported,
//! not just the first one.

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("GEMINI_API_KEY environment variable is required")]
    MissingApiKey,
    #[error("upstream url `{0}` is not a valid http(s) URL")]
    InvalidUpstreamUrl(String),
    #[error("timeout `{0}` must be greater than zero")]
    ZeroTimeout(&'static str),
    #[error("max_body_size must be greater than zero")]
    ZeroBodyLimit,
    #[error("allowed origin `{0}` must not be empty or contain whitespace")]
    MalformedOrigin(String),
}

impl ValidationError {
    /// Errors that must abort startup regardless of anything else.
    pub fn is_fatal_credential(&self) -> bool {
        matches!(self, ValidationError::MissingApiKey)
    }
}

/// Validate a loaded configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match config.upstream.api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => {}
        _ => errors.push(ValidationError::MissingApiKey),
    }

    match Url::parse(&config.upstream.url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        _ => errors.push(ValidationError::InvalidUpstreamUrl(config.upstream.url.clone())),
    }

    let timeouts = [
        ("connect_secs", config.timeouts.connect_secs),
        ("upstream_secs", config.timeouts.upstream_secs),
        ("request_secs", config.timeouts.request_secs),
    ];
    for (name, value) in timeouts {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    for origin in &config.security.allowed_origins {
        if origin.is_empty() || origin.chars().any(char::is_whitespace) {
            errors.push(ValidationError::MalformedOrigin(origin.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
