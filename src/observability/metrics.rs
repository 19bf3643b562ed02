//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by route, status
//! - `gateway_request_duration_seconds` (histogram): latency by route
//! - `gateway_search_attempts_total` (counter): instance attempts by family, outcome
//! - `gateway_passthrough_total` (counter): passthrough outcomes
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_search_attempt(family: &str, outcome: &'static str) {
    metrics::counter!(
        "gateway_search_attempts_total",
        "family" => family.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_passthrough(outcome: &'static str) {
    metrics::counter!("gateway_passthrough_total", "outcome" => outcome).increment(1);
}
