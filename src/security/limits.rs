//! Request size limits.
//!
//! Bodies over `security.max_body_size` are rejected with 413 before the
//! handler deserializes them. The limit sits inside the origin gate, so a
//! rejected origin gets its 403 whatever the body size.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tower_http::limit::RequestBodyLimitLayer;

use crate::config::SecurityConfig;
use crate::http::ProxyError;

pub fn body_limit_layer(config: &SecurityConfig) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(config.max_body_size)
}

/// Replace the limit layer's plain-text 413 with the proxy's JSON error body.
pub async fn payload_too_large_json(response: Response) -> Response {
    if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ProxyError::PayloadTooLarge.into_response()
    } else {
        response
    }
}
