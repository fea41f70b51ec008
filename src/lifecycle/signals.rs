//! OS signal handling.
//!
//! - SIGTERM / SIGINT end the process gracefully
//! - SIGHUP forces an immediate rule reload

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::watcher::ReloadTrigger;

/// Resolve once SIGTERM or Ctrl-C is received.
pub async fn termination() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("SIGINT received"),
        _ = terminate => tracing::info!("SIGTERM received"),
    }
}

/// Forward SIGHUP to `trigger` until shutdown.
#[cfg(unix)]
pub fn reload_on_hangup(
    trigger: ReloadTrigger,
    mut shutdown: broadcast::Receiver<()>,
) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(()) = hangup.recv() => {
                    tracing::info!("SIGHUP received");
                    if !trigger.trigger() {
                        break;
                    }
                }
                _ = shutdown.recv() => break,
            }
        }
    }))
}

/// SIGHUP does not exist here; reloads are file-driven only.
#[cfg(not(unix))]
pub fn reload_on_hangup(
    _trigger: ReloadTrigger,
    mut shutdown: broadcast::Receiver<()>,
) -> std::io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        let _ = shutdown.recv().await;
    }))
}
