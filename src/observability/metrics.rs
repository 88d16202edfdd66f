//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define balancer metrics (requests, latency, errors, connections, health)
//! - Expose Prometheus-compatible metrics endpoint
//! - Track per-backend metrics
//!
//! # Metrics
//! - `balancer_requests_total` (counter): forwarded requests by backend, status
//! - `balancer_request_duration_seconds` (histogram): forward latency
//! - `balancer_backend_errors_total` (counter): failed forwards by backend
//! - `balancer_active_connections` (gauge): in-flight requests per backend
//! - `balancer_backend_health` (gauge): 1=healthy, 0=unhealthy
//!
//! # Design Decisions
//! - Recording is a no-op until the exporter is installed

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed forward.
pub fn record_request(backend: &str, status: u16, start: Instant) {
    counter!(
        "balancer_requests_total",
        "backend" => backend.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("balancer_request_duration_seconds", "backend" => backend.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a failed forward.
pub fn record_backend_error(backend: &str) {
    counter!("balancer_backend_errors_total", "backend" => backend.to_string()).increment(1);
}

/// Record the current in-flight count for a backend.
pub fn record_active_connections(backend: &str, count: usize) {
    gauge!("balancer_active_connections", "backend" => backend.to_string()).set(count as f64);
}

/// Record the probe outcome for a backend.
pub fn record_backend_health(backend: &str, healthy: bool) {
    gauge!("balancer_backend_health", "backend" => backend.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
