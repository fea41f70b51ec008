//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the initial rule set; a missing or malformed file is fatal
//! - Establish the file watch; failure here is fatal too
//! - Bind the listener last, so traffic only arrives once rules exist
//!
//! [`Service`] is the composition root: it owns the routing table and
//! hands shared references to the watcher and the HTTP layer.

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::loader::{load_rules, ConfigError};
use crate::config::schema::ServerConfig;
use crate::config::watcher::{ConfigWatcher, ReloadTrigger, WatchError};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals;
use crate::observability::metrics;
use crate::routing::RoutingTable;

/// How long to wait for the watcher task after the server has stopped.
const WATCHER_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Anything that prevents the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("can not load config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error("can not bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// A started but not yet serving redirect service.
pub struct Service {
    config: ServerConfig,
    table: Arc<RoutingTable>,
    listener: TcpListener,
    shutdown: Shutdown,
    watcher: JoinHandle<()>,
    reload: ReloadTrigger,
}

impl Service {
    /// Run every startup step in order. Must be called inside a tokio runtime.
    pub async fn start(config: ServerConfig) -> Result<Self, StartupError> {
        let rules = load_rules(&config.rules_path).map_err(|source| StartupError::Config {
            path: config.rules_path.clone(),
            source,
        })?;
        let rule_count = rules.len();
        let table = Arc::new(RoutingTable::with_rules(rules));
        metrics::record_table(table.version(), rule_count);
        tracing::info!(path = %config.rules_path.display(), rules = rule_count, "Config loaded");

        let shutdown = Shutdown::new();
        let watcher = ConfigWatcher::new(&config.rules_path, table.clone(), config.debounce());
        let reload = watcher.reload_trigger();
        let watcher = watcher.spawn(shutdown.subscribe())?;

        let address = listen_address(&config.bind_address);
        let listener = match TcpListener::bind(&address).await {
            Ok(listener) => listener,
            Err(source) => {
                shutdown.trigger();
                return Err(StartupError::Bind { address, source });
            }
        };

        Ok(Self {
            config,
            table,
            listener,
            shutdown,
            watcher,
            reload,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn table(&self) -> Arc<RoutingTable> {
        self.table.clone()
    }

    pub fn reload_trigger(&self) -> ReloadTrigger {
        self.reload.clone()
    }

    /// Serve until SIGTERM or Ctrl-C.
    pub async fn run(self) -> std::io::Result<()> {
        self.run_until(signals::termination()).await
    }

    /// Serve until `signal` resolves, then shut down gracefully.
    pub async fn run_until<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Self {
            config,
            table,
            listener,
            shutdown,
            watcher,
            reload,
        } = self;

        let hangup = signals::reload_on_hangup(reload, shutdown.subscribe())?;
        let server_shutdown = shutdown.subscribe();

        let trigger = shutdown.clone();
        tokio::spawn(async move {
            signal.await;
            trigger.trigger();
        });

        let server = HttpServer::new(table, &config);
        let result = server.run(listener, server_shutdown).await;

        if !shutdown.is_triggered() {
            tracing::warn!("HTTP server stopped without a shutdown signal");
        }
        shutdown.trigger();
        if tokio::time::timeout(WATCHER_STOP_TIMEOUT, watcher).await.is_err() {
            tracing::warn!("Config watcher did not stop in time");
        }
        hangup.abort();

        result
    }
}

/// Accept Go-style `:8080` as "all interfaces, port 8080".
pub fn listen_address(bind: &str) -> String {
    if bind.starts_with(':') {
        format!("0.0.0.0{bind}")
    } else {
        bind.to_string()
    }
}
