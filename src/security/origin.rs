//! Origin gate.
//!
//! A request passes when its `Origin` header is absent or empty, exactly
//! matches an allow-listed origin (case-sensitive), starts with a loopback
//! prefix, or names a private-network IP literal (`10.`, `172.`, `192.`).
//! Everything else is rejected with 403 before any upstream work happens.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::http::response::ProxyError;
use crate::observability::metrics;

const LOOPBACK_PREFIXES: [&str; 2] = ["http://localhost", "http://127.0.0.1"];
const PRIVATE_PREFIXES: [&str; 3] = ["192.", "10.", "172."];

/// Outcome of checking a declared origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginDecision {
    /// No origin was declared (non-browser caller).
    Absent,
    AllowListed,
    Loopback,
    PrivateNetwork,
    Rejected,
}

impl OriginDecision {
    pub fn is_permitted(self) -> bool {
        !matches!(self, OriginDecision::Rejected)
    }
}

/// Read-only origin policy built once at startup.
#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    allowed: Vec<String>,
}

impl OriginPolicy {
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed
    }

    /// Classify a declared origin.
    pub fn check(&self, origin: Option<&str>) -> OriginDecision {
        let origin = match origin {
            None | Some("") => return OriginDecision::Absent,
            Some(o) => o,
        };

        if self.allowed.iter().any(|a| a == origin) {
            OriginDecision::AllowListed
        } else if LOOPBACK_PREFIXES.iter().any(|p| origin.starts_with(p)) {
            OriginDecision::Loopback
        } else if is_private_network(origin) {
            OriginDecision::PrivateNetwork
        } else {
            OriginDecision::Rejected
        }
    }

    pub fn permits(&self, origin: Option<&str>) -> bool {
        self.check(origin).is_permitted()
    }

    /// Header-level variant used by the CORS layer.
    pub fn permits_header(&self, origin: &HeaderValue) -> bool {
        origin.to_str().map(|o| self.permits(Some(o))).unwrap_or(false)
    }
}

/// `^https?://(192|10|172)\.`
fn is_private_network(origin: &str) -> bool {
    let rest = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"));
    match rest {
        Some(host) => PRIVATE_PREFIXES.iter().any(|p| host.starts_with(p)),
        None => false,
    }
}

/// Middleware rejecting requests whose origin the policy does not permit.
pub async fn origin_gate_middleware(
    State(policy): State<Arc<OriginPolicy>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let origin = match request.headers().get(header::ORIGIN) {
        None => None,
        Some(value) => match value.to_str() {
            Ok(s) => Some(s.to_string()),
            // Non-ASCII origins cannot match any rule.
            Err(_) => Some(String::from_utf8_lossy(value.as_bytes()).into_owned()),
        },
    };

    let decision = policy.check(origin.as_deref());
    if decision.is_permitted() {
        tracing::trace!(origin = ?origin, decision = ?decision, "Origin accepted");
        return next.run(request).await;
    }

    tracing::warn!(
        origin = origin.as_deref().unwrap_or_default(),
        path = %request.uri().path(),
        "Rejected request from unauthorized origin"
    );
    metrics::record_origin_rejection();
    ProxyError::OriginRejected.into_response()
}
