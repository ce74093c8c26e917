//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by endpoint, status
//! - `proxy_request_duration_seconds` (histogram): latency by endpoint
//! - `proxy_origin_rejections_total` (counter): requests refused by the origin gate
//! - `proxy_upstream_failures_total` (counter): upstream failures by endpoint, kind
//!
//! Recording is a no-op until a recorder is installed, so handlers record
//! unconditionally.

use std::net::SocketAddr;
use std::time::Instant;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(endpoint: &'static str, status: u16, start_time: Instant) {
    ::metrics::counter!(
        "proxy_requests_total",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("proxy_request_duration_seconds", "endpoint" => endpoint)
        .record(start_time.elapsed().as_secs_f64());
}

pub fn record_origin_rejection() {
    ::metrics::counter!("proxy_origin_rejections_total").increment(1);
}

pub fn record_upstream_failure(endpoint: &'static str, kind: &'static str) {
    ::metrics::counter!(
        "proxy_upstream_failures_total",
        "endpoint" => endpoint,
        "kind" => kind
    )
    .increment(1);
}
