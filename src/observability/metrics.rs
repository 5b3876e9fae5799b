//! Metrics collection and exposition.
//!
//! # Metrics
//! - `doc_orchestrator_errors_normalized_total` (counter): handled errors by status
//! - `doc_orchestrator_startup_stage` (gauge): ordinal of the current startup stage
//! - `doc_orchestrator_registration_total` (counter): registration attempts by outcome
//! - `doc_orchestrator_consumer_up` (gauge): 1 while a queue consumer runs

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_normalized_error(status: u16) {
    counter!("doc_orchestrator_errors_normalized_total", "status" => status.to_string()).increment(1);
}

pub fn record_startup_stage(ordinal: u8) {
    gauge!("doc_orchestrator_startup_stage").set(f64::from(ordinal));
}

pub fn record_registration(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("doc_orchestrator_registration_total", "outcome" => outcome).increment(1);
}

pub fn record_consumer_up(queue: &str, up: bool) {
    gauge!("doc_orchestrator_consumer_up", "queue" => queue.to_string()).set(if up { 1.0 } else { 0.0 });
}
