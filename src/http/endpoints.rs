//! Generation endpoints.
//!
//! `/api/chat`, `/api/planner` and `/api/course-outline` share one contract:
//! take `{contents, systemInstruction}`, forward it upstream unchanged, and
//! return the upstream JSON. They differ only in log label and failure text.

use std::fmt;
use std::time::Instant;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::http::request::request_id;
use crate::http::response::ProxyError;
use crate::http::server::AppState;
use crate::observability::{logging::display_chain, metrics};
use crate::upstream::ChatPayload;

/// One of the proxy's generation endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Chat,
    Planner,
    CourseOutline,
}

impl Endpoint {
    pub const ALL: [Endpoint; 3] = [Endpoint::Chat, Endpoint::Planner, Endpoint::CourseOutline];

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Chat => "/api/chat",
            Endpoint::Planner => "/api/planner",
            Endpoint::CourseOutline => "/api/course-outline",
        }
    }

    /// Log and metric label.
    pub fn label(self) -> &'static str {
        match self {
            Endpoint::Chat => "chat",
            Endpoint::Planner => "planner",
            Endpoint::CourseOutline => "course-outline",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            Endpoint::Chat => "Failed to process chat request",
            Endpoint::Planner => "Failed to process planner request",
            Endpoint::CourseOutline => "Failed to process course outline request",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub async fn chat(
    state: State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ChatPayload>, JsonRejection>,
) -> Result<Json<Value>, ProxyError> {
    forward(Endpoint::Chat, state, headers, body).await
}

pub async fn planner(
    state: State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ChatPayload>, JsonRejection>,
) -> Result<Json<Value>, ProxyError> {
    forward(Endpoint::Planner, state, headers, body).await
}

pub async fn course_outline(
    state: State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ChatPayload>, JsonRejection>,
) -> Result<Json<Value>, ProxyError> {
    forward(Endpoint::CourseOutline, state, headers, body).await
}

/// Forward one already origin-checked request upstream.
async fn forward(
    endpoint: Endpoint,
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ChatPayload>, JsonRejection>,
) -> Result<Json<Value>, ProxyError> {
    let start_time = Instant::now();
    let request_id = request_id(&headers);

    let payload = match body {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            let err = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ProxyError::PayloadTooLarge
            } else {
                ProxyError::InvalidBody { endpoint, detail: rejection.body_text() }
            };
            tracing::error!(request_id = %request_id, endpoint = %endpoint, error = %err, "Rejected request body");
            metrics::record_request(endpoint.label(), err.status().as_u16(), start_time);
            return Err(err);
        }
    };

    tracing::info!(
        request_id = %request_id,
        endpoint = %endpoint,
        turns = payload.turn_count(),
        "Request received"
    );
    tracing::debug!(request_id = %request_id, payload = ?payload, "Request payload");

    match state.upstream.generate(&payload).await {
        Ok(result) => {
            tracing::info!(
                request_id = %request_id,
                endpoint = %endpoint,
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Response sent successfully"
            );
            metrics::record_request(endpoint.label(), StatusCode::OK.as_u16(), start_time);
            Ok(Json(result))
        }
        Err(source) => {
            tracing::error!(
                request_id = %request_id,
                endpoint = %endpoint,
                error = %display_chain(&source),
                "Upstream call failed"
            );
            metrics::record_upstream_failure(endpoint.label(), source.kind());
            let err = ProxyError::Upstream { endpoint, source };
            metrics::record_request(endpoint.label(), err.status().as_u16(), start_time);
            Err(err)
        }
    }
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_table() {
        assert_eq!(Endpoint::Chat.path(), "/api/chat");
        assert_eq!(Endpoint::CourseOutline.path(), "/api/course-outline");
        assert_eq!(
            Endpoint::CourseOutline.failure_message(),
            "Failed to process course outline request"
        );
        assert_eq!(Endpoint::Planner.to_string(), "planner");
    }
}
