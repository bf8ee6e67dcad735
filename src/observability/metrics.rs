//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): dispatched requests by method, route, status
//! - `router_request_duration_seconds` (histogram): dispatch latency by method, route
//! - `router_method_not_allowed_total` (counter): requests rejected with 405
//! - `router_dispatch_errors_total` (counter): pipeline failures by kind
//!
//! # Design Decisions
//! - Labels use the route template, never the raw path, to bound cardinality
//! - Recording without an installed exporter is a no-op

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one dispatched request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "router_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        "router_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_method_not_allowed() {
    counter!("router_method_not_allowed_total").increment(1);
}

pub fn record_dispatch_error(kind: &'static str) {
    counter!("router_dispatch_errors_total", "kind" => kind).increment(1);
}
