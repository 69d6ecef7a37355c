//! Metrics collection and exposition.
//!
//! # Metrics
//! - `itranswarp_requests_total` (counter): requests by method, area, status
//! - `itranswarp_request_duration_seconds` (histogram): latency distribution
//! - `itranswarp_errors_total` (counter): translated errors by kind
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels stay low-cardinality: no raw paths

use std::net::SocketAddr;
use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::pipeline::area::{Area, API_PREFIX};

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Label for the area a path belongs to.
pub fn area_label(path: &str) -> &'static str {
    if path.starts_with(API_PREFIX) {
        return "api";
    }
    match Area::of(path) {
        Area::Manage => "manage",
        Area::Theme => "theme",
    }
}

pub fn record_request(method: &str, status: u16, area: &'static str, start: Instant) {
    metrics::counter!(
        "itranswarp_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "area" => area
    )
    .increment(1);
    metrics::histogram!(
        "itranswarp_request_duration_seconds",
        "method" => method.to_string(),
        "area" => area
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_error(kind: &'static str) {
    metrics::counter!("itranswarp_errors_total", "kind" => kind).increment(1);
}

pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let area = area_label(request.uri().path());
    let response = next.run(request).await;
    record_request(&method, response.status().as_u16(), area, start);
    response
}
