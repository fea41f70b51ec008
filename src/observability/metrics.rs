//! Metrics collection and exposition.
//!
//! # Metrics
//! - `redirect_requests_total` (counter): requests by outcome (`redirect`, `not_found`)
//! - `config_reloads_total` (counter): reload attempts by result (`success`, `failure`)
//! - `routing_rules` (gauge): rule count of the current snapshot
//! - `routing_table_version` (gauge): version of the current snapshot

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), metrics_exporter_prometheus::BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Request outcome, used as the `outcome` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Redirect,
    NotFound,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Outcome::Redirect => "redirect",
            Outcome::NotFound => "not_found",
        }
    }
}

pub fn record_request(outcome: Outcome) {
    metrics::counter!("redirect_requests_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_reload(success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!("config_reloads_total", "result" => result).increment(1);
}

pub fn record_table(version: u64, rules: usize) {
    metrics::gauge!("routing_table_version").set(version as f64);
    metrics::gauge!("routing_rules").set(rules as f64);
}
