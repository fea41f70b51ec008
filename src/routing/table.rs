//! Hot-swappable routing table.
//!
//! # Responsibilities
//! - Hold the current [`RoutingSnapshot`]
//! - Serve concurrent lookups without locking
//! - Replace the snapshot atomically on reload
//!
//! # Design Decisions
//! - `ArcSwap` holds the current snapshot; readers load the pointer and scan
//!   their own `Arc`, so a concurrent `set` never blocks or tears a lookup
//! - Writers are serialised by a mutex around the version counter, held
//!   only for the duration of the swap
//! - Every publish gets a strictly increasing version

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use crate::config::schema::Rule;
use crate::routing::snapshot::RoutingSnapshot;

/// Concurrency-safe holder of the current rule set.
#[derive(Debug)]
pub struct RoutingTable {
    current: ArcSwap<RoutingSnapshot>,
    /// Last published version. Locked for the duration of a `set`.
    version: Mutex<u64>,
}

impl RoutingTable {
    /// Create an empty table (version 0).
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(RoutingSnapshot::default()),
            version: Mutex::new(0),
        }
    }

    /// Create a table with an initial rule set installed as version 1.
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        let table = Self::new();
        table.set(rules);
        table
    }

    /// Install `rules` as the new current snapshot.
    ///
    /// Lookups already in progress finish against the snapshot they loaded.
    /// Returns the version assigned to the new snapshot.
    pub fn set(&self, rules: Vec<Rule>) -> u64 {
        // The counter is a plain integer; a panic elsewhere cannot leave it torn.
        let mut version = self.version.lock().unwrap_or_else(PoisonError::into_inner);
        *version += 1;

        let snapshot = RoutingSnapshot::new(*version, rules);
        let rule_count = snapshot.len();
        self.current.store(Arc::new(snapshot));

        tracing::debug!(version = *version, rules = rule_count, "Routing table updated");
        *version
    }

    /// Find the first rule whose `from` equals `host` exactly.
    pub fn lookup(&self, host: &str) -> Option<Arc<Rule>> {
        self.current.load().find(host).cloned()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<RoutingSnapshot> {
        self.current.load_full()
    }

    /// Version of the current snapshot.
    pub fn version(&self) -> u64 {
        self.current.load().version()
    }

    /// Number of rules in the current snapshot.
    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::new()
    }
}

/// A shared reference to the routing table.
pub type SharedRoutingTable = Arc<RoutingTable>;
