//! Configuration schema definitions.
//!
//! Two kinds of configuration live here:
//! - [`Rule`]: one redirect directive, read from the watched rule file.
//! - [`ServerConfig`]: process settings, built from CLI flags at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A single host redirect directive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    /// Source host, matched exactly against the request host.
    pub from: String,

    /// Destination URL prefix (scheme + host). The request's
    /// path-and-query is appended verbatim.
    pub to: String,

    /// HTTP status code sent with the redirect. Any integer is accepted;
    /// one that cannot go on a status line fails only its own requests.
    pub status: i64,
}

impl Rule {
    pub fn new(from: impl Into<String>, to: impl Into<String>, status: i64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            status,
        }
    }

    /// Build the redirect target for a request path-and-query.
    pub fn target(&self, path_and_query: &str) -> String {
        let mut target = String::with_capacity(self.to.len() + path_and_query.len());
        target.push_str(&self.to);
        target.push_str(path_and_query);
        target
    }
}

/// Top-level document shape for TOML rule files (`[[rules]]`).
///
/// YAML and JSON files are a bare sequence of rules instead.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RuleDocument {
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, for development.
    #[default]
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
}

/// Root process configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Path of the watched rule file.
    pub rules_path: PathBuf,

    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Quiet period after a change notification before reloading.
    pub debounce_ms: u64,

    /// How long in-flight requests may run after a shutdown signal.
    pub shutdown_grace_secs: u64,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ServerConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            rules_path: PathBuf::from("config.yaml"),
            bind_address: "0.0.0.0:8080".to_string(),
            debounce_ms: 1000,
            shutdown_grace_secs: 60,
            request_timeout_secs: 30,
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Prometheus exporter bind address; disabled when `None`.
    pub metrics_address: Option<SocketAddr>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "host_redirect=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_address: None,
        }
    }
}
