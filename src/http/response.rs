//! Response handling and error mapping.
//!
//! # Responsibilities
//! - Map handler failures to generic JSON error bodies
//! - Keep upstream detail and the credential out of every response
//!
//! # Design Decisions
//! - 403 only for origin rejection; every other failure on an endpoint is a
//!   500 carrying that endpoint's fixed message
//! - The underlying error is logged by the handler, not serialized

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::http::endpoints::Endpoint;
use crate::upstream::UpstreamError;

pub const UNAUTHORIZED_ORIGIN: &str = "Unauthorized origin";

/// JSON error body: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

/// A request that could not be served.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("origin not allowed")]
    OriginRejected,
    #[error("request body exceeds the configured limit")]
    PayloadTooLarge,
    #[error("malformed request body for {endpoint}: {detail}")]
    InvalidBody { endpoint: Endpoint, detail: String },
    #[error("{endpoint} upstream call failed: {source}")]
    Upstream {
        endpoint: Endpoint,
        #[source]
        source: UpstreamError,
    },
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::OriginRejected => StatusCode::FORBIDDEN,
            ProxyError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::InvalidBody { .. } | ProxyError::Upstream { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The only text a caller ever sees.
    pub fn public_message(&self) -> &'static str {
        match self {
            ProxyError::OriginRejected => UNAUTHORIZED_ORIGIN,
            ProxyError::PayloadTooLarge => "Request body too large",
            ProxyError::InvalidBody { endpoint, .. } | ProxyError::Upstream { endpoint, .. } => {
                endpoint.failure_message()
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody { error: self.public_message() })).into_response()
    }
}
