//! host-redirect
//!
//! Answers every request with a redirect chosen by the request host.
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!    Client Request     │  ┌────────┐    ┌──────────┐    ┌───────────┐ │
//!   ────────────────────┼─▶│  http  │───▶│ request  │───▶│  routing  │ │
//!                       │  │ server │    │ (host)   │    │  table    │ │
//!                       │  └────────┘    └──────────┘    └─────┬─────┘ │
//!    301/302/.../404    │  ┌──────────┐                        │       │
//!   ◀───────────────────┼──│ response │◀───────────────────────┘       │
//!                       │  └──────────┘                  ▲ set()       │
//!                       │                                │             │
//!    config.yaml ───────┼──▶ notify ──▶ ConfigWatcher ───┘             │
//!                       │              (debounce, reload)              │
//!                       └──────────────────────────────────────────────┘
//! ```

use clap::Parser;

use host_redirect::cli::Cli;
use host_redirect::lifecycle::Service;
use host_redirect::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config();

    logging::init(&config.observability)?;

    tracing::info!("host-redirect v{} starting", env!("CARGO_PKG_VERSION"));

    if let Some(addr) = config.observability.metrics_address {
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(metrics_address = %addr, error = %e, "Failed to start metrics exporter");
        }
    }

    tracing::info!(
        config = %config.rules_path.display(),
        bind_address = %config.bind_address,
        debounce_ms = config.debounce_ms,
        shutdown_grace_secs = config.shutdown_grace_secs,
        "Starting"
    );

    let service = match Service::start(config).await {
        Ok(service) => service,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };

    tracing::info!(address = %service.local_addr()?, "Listening for connections");
    service.run().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
