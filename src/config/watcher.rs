//! Rule file watcher for hot reload.
//!
//! # State Machine
//! ```text
//! Idle ──change event──▶ Debouncing ──quiet period──▶ Reloading
//!  ▲                        │ (more events coalesced)     │
//!  │                        ▼                             ├─ ok ──▶ Publishing ─┐
//!  │                    shutdown → exit                   └─ err ─▶ log ────────┤
//!  └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The watch is re-registered after every burst because some backends drop
//! it when an editor saves by renaming a temp file over the watched one.
//! If the file is missing at that moment no further events can arrive, so
//! re-registration is retried once per debounce interval until it succeeds,
//! followed by a reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::config::loader::{load_rules, ConfigError};
use crate::config::schema::Rule;
use crate::observability::metrics;
use crate::routing::RoutingTable;

/// Failure to establish the initial watch.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to watch {path}: {source}")]
    Notify {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// What a filesystem event means for the rule file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Content written in place, or the file was (re)created.
    Write,
    /// The file was renamed or removed, as in an atomic replace.
    Rename,
    /// Metadata or access only; no reload needed.
    Other,
}

impl ChangeKind {
    pub fn classify(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => ChangeKind::Write,
            EventKind::Modify(ModifyKind::Name(_)) => ChangeKind::Rename,
            EventKind::Modify(ModifyKind::Metadata(_)) => ChangeKind::Other,
            EventKind::Modify(_) => ChangeKind::Write,
            EventKind::Remove(_) => ChangeKind::Rename,
            EventKind::Access(_) | EventKind::Any | EventKind::Other => ChangeKind::Other,
        }
    }

    pub fn needs_reload(self) -> bool {
        matches!(self, ChangeKind::Write | ChangeKind::Rename)
    }
}

/// (Re)registration of the filesystem watch on one path.
pub trait Rewatch: Send + 'static {
    fn rewatch(&mut self, path: &Path) -> notify::Result<()>;
}

impl Rewatch for RecommendedWatcher {
    fn rewatch(&mut self, path: &Path) -> notify::Result<()> {
        // The old registration may already be gone after a rename.
        let _ = self.unwatch(path);
        self.watch(path, RecursiveMode::NonRecursive)
    }
}

/// Handle for requesting an immediate reload, bypassing the debounce.
#[derive(Debug, Clone)]
pub struct ReloadTrigger {
    tx: mpsc::UnboundedSender<()>,
}

impl ReloadTrigger {
    /// Request a reload. Returns false if the watcher has stopped.
    pub fn trigger(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

/// Keeps a [`RoutingTable`] in sync with a rule file.
pub struct ConfigWatcher {
    path: PathBuf,
    table: Arc<RoutingTable>,
    debounce: Duration,
    manual_tx: mpsc::UnboundedSender<()>,
    manual_rx: mpsc::UnboundedReceiver<()>,
}

impl ConfigWatcher {
    /// Create a watcher for `path` that publishes into `table`.
    pub fn new(path: &Path, table: Arc<RoutingTable>, debounce: Duration) -> Self {
        let (manual_tx, manual_rx) = mpsc::unbounded_channel();
        Self {
            path: path.to_path_buf(),
            table,
            debounce,
            manual_tx,
            manual_rx,
        }
    }

    /// A handle that forces a reload (e.g. on SIGHUP).
    pub fn reload_trigger(&self) -> ReloadTrigger {
        ReloadTrigger {
            tx: self.manual_tx.clone(),
        }
    }

    /// Register the watch and spawn the event loop on the current runtime.
    ///
    /// Fails if the initial watch cannot be established.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> Result<JoinHandle<()>, WatchError> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = event_tx.send(res);
            },
            notify::Config::default(),
        )
        .map_err(|source| WatchError::Notify {
            path: self.path.clone(),
            source,
        })?;

        watcher
            .watch(&self.path, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Notify {
                path: self.path.clone(),
                source,
            })?;

        tracing::info!(path = %self.path.display(), debounce = ?self.debounce, "Config watcher started");
        Ok(tokio::spawn(self.run(watcher, event_rx, shutdown)))
    }

    /// Drive the state machine until shutdown or until the event source closes.
    pub async fn run<R: Rewatch>(
        mut self,
        mut watch: R,
        mut events: mpsc::UnboundedReceiver<notify::Result<Event>>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        let mut watching = true;

        loop {
            // Idle
            let first = tokio::select! {
                event = events.recv() => match event {
                    Some(event) => event,
                    None => {
                        tracing::warn!("Config watch event stream closed, watcher exiting");
                        break;
                    }
                },
                Some(()) = self.manual_rx.recv() => {
                    tracing::info!(path = %self.path.display(), "Manual config reload requested");
                    self.reload().await;
                    continue;
                }
                _ = tokio::time::sleep(self.debounce), if !watching => {
                    if watch.rewatch(&self.path).is_ok() {
                        tracing::info!(path = %self.path.display(), "Config watch re-established");
                        watching = true;
                        self.reload().await;
                    }
                    continue;
                }
                _ = shutdown.recv() => break,
            };

            let mut reload = self.observe(first);

            // Debouncing
            tokio::select! {
                _ = tokio::time::sleep(self.debounce) => {}
                _ = shutdown.recv() => break,
            }
            while let Ok(event) = events.try_recv() {
                reload |= self.observe(event);
            }

            // Reloading
            watching = match watch.rewatch(&self.path) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "Failed to re-register config watch, retrying");
                    false
                }
            };
            if reload {
                self.reload().await;
            }
        }

        tracing::info!("Config watcher stopped");
    }

    /// Log one raw event; returns true if it calls for a reload.
    fn observe(&self, event: notify::Result<Event>) -> bool {
        match event {
            Ok(event) => {
                let change = ChangeKind::classify(&event.kind);
                tracing::debug!(path = %self.path.display(), kind = ?event.kind, change = ?change, "Config file event");
                change.needs_reload()
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Config watcher error");
                false
            }
        }
    }

    /// Load the rule file and publish it. Failures leave the table untouched.
    async fn reload(&self) {
        match load_off_thread(&self.path).await {
            Ok(rules) => {
                let count = rules.len();
                let version = self.table.set(rules);
                metrics::record_reload(true);
                metrics::record_table(version, count);
                tracing::info!(path = %self.path.display(), version, rules = count, "Config reloaded");
            }
            Err(e) => {
                metrics::record_reload(false);
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    version = self.table.version(),
                    "Config reload failed, keeping current rules"
                );
            }
        }
    }
}

async fn load_off_thread(path: &Path) -> Result<Vec<Rule>, ConfigError> {
    let path = path.to_path_buf();
    match tokio::task::spawn_blocking(move || load_rules(&path)).await {
        Ok(result) => result,
        Err(e) => Err(ConfigError::Io(std::io::Error::other(e))),
    }
}
