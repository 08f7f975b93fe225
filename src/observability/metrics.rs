//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_api_calls_total` (counter): API calls by method and result code
//! - `gateway_api_call_duration_seconds` (histogram): dispatch latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::command::ResultCode;

/// Install the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed API call.
pub fn record_api_call(method: &str, code: ResultCode, start: Instant) {
    metrics::counter!(
        "gateway_api_calls_total",
        "method" => method.to_string(),
        "code" => code.label()
    )
    .increment(1);
    metrics::histogram!("gateway_api_call_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}
