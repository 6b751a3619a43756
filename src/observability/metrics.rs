//! Metrics collection and exposition.
//!
//! # Metrics
//! - `audit_requests_total` (counter): `/audit` requests by outcome
//! - `audit_pipelines_total` (counter): finished pipelines by outcome
//! - `audit_cache_lookups_total` (counter): result cache lookups by result
//! - `audit_cache_evictions_total` (counter): LRU evictions
//! - `audit_coalesced_total` (counter): requests that joined an in-flight audit
//! - `audit_pipeline_duration_seconds` (histogram): engine-to-cache latency
//! - `audit_queue_depth` (gauge): jobs waiting for admission
//! - `audit_rate_limited_total` (counter): rejected requests by route
//!
//! Without an installed recorder every call is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder with its own HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(outcome: &'static str) {
    counter!("audit_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_audit(outcome: &'static str) {
    counter!("audit_pipelines_total", "outcome" => outcome).increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("audit_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_cache_eviction() {
    counter!("audit_cache_evictions_total").increment(1);
}

pub fn record_coalesced() {
    counter!("audit_coalesced_total").increment(1);
}

pub fn record_pipeline_duration(start: Instant) {
    histogram!("audit_pipeline_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn set_queue_depth(depth: usize) {
    gauge!("audit_queue_depth").set(depth as f64);
}

pub fn record_rate_limited(route: &'static str) {
    counter!("audit_rate_limited_total", "route" => route).increment(1);
}
