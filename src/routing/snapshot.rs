//! Immutable, versioned rule set.

use std::sync::Arc;

use crate::config::schema::Rule;

/// The rule set at one point in time.
///
/// Never mutated after construction. A reload produces a new snapshot.
#[derive(Debug, Default)]
pub struct RoutingSnapshot {
    version: u64,
    rules: Vec<Arc<Rule>>,
}

impl RoutingSnapshot {
    pub fn new(version: u64, rules: Vec<Rule>) -> Self {
        Self {
            version,
            rules: rules.into_iter().map(Arc::new).collect(),
        }
    }

    /// First rule whose `from` equals `host`.
    pub fn find(&self, host: &str) -> Option<&Arc<Rule>> {
        self.rules.iter().find(|rule| rule.from == host)
    }

    /// Publish sequence number; 0 is the empty table before the first set.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().map(|rule| rule.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
