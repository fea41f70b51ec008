//! Command-line interface.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::config::schema::{LogFormat, ObservabilityConfig, ServerConfig};

#[derive(Debug, Parser)]
#[command(name = "host-redirect")]
#[command(version, about = "Redirects requests by host according to a hot-reloaded rule file", long_about = None)]
pub struct Cli {
    /// Rule file (YAML, JSON or TOML by extension)
    #[arg(short, long, env = "REDIRECT_CONFIG", default_value = "config.yaml")]
    pub config: PathBuf,

    /// Address to listen on
    #[arg(short, long, env = "REDIRECT_ADDR", default_value = "0.0.0.0:8080")]
    pub addr: String,

    /// Quiet period after a file change before reloading, in milliseconds
    #[arg(long, env = "REDIRECT_DEBOUNCE_MS", default_value_t = 1000)]
    pub debounce_ms: u64,

    /// Time allowed for in-flight requests after SIGTERM, in seconds
    #[arg(long, env = "REDIRECT_SHUTDOWN_GRACE_SECS", default_value_t = 60)]
    pub shutdown_grace_secs: u64,

    /// Per-request timeout, in seconds
    #[arg(long, env = "REDIRECT_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Log output format
    #[arg(long, env = "REDIRECT_LOG_FORMAT", value_enum, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Serve Prometheus metrics on this address
    #[arg(long, env = "REDIRECT_METRICS_ADDR")]
    pub metrics_addr: Option<SocketAddr>,
}

impl Cli {
    pub fn into_config(self) -> ServerConfig {
        ServerConfig {
            rules_path: self.config,
            bind_address: self.addr,
            debounce_ms: self.debounce_ms,
            shutdown_grace_secs: self.shutdown_grace_secs,
            request_timeout_secs: self.request_timeout_secs,
            observability: ObservabilityConfig {
                log_format: self.log_format,
                metrics_address: self.metrics_addr,
                ..ObservabilityConfig::default()
            },
        }
    }
}
