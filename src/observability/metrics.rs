//! Metrics collection and exposition.
//!
//! # Metrics
//! - `tracker_requests_total` (counter): requests by method, status
//! - `tracker_request_duration_seconds` (histogram): latency by method
//! - `tracker_store_operations_total` (counter): store calls by op, outcome
//! - `tracker_issues_stored` (gauge): documents currently held

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

/// Record a completed API request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "tracker_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("tracker_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of a store operation.
pub fn record_store_op(op: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!("tracker_store_operations_total", "op" => op, "outcome" => outcome)
        .increment(1);
}

/// Record how many issues the store holds.
pub fn record_issue_count(count: usize) {
    metrics::gauge!("tracker_issues_stored").set(count as f64);
}
