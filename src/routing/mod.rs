//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request host
//!     → table.rs (load current snapshot, no lock)
//!     → snapshot.rs (first rule whose `from` equals the host)
//!     → Return: matched Rule or None
//!
//! Reload:
//!     Vec<Rule> (validated by config::loader)
//!     → RoutingSnapshot (immutable, versioned)
//!     → RoutingTable::set (atomic pointer swap)
//! ```
//!
//! # Design Decisions
//! - Snapshots are immutable; a reload builds a new one
//! - Readers hold an `Arc` to the snapshot they started with
//! - Exact host match: no wildcards, no case folding
//! - First match wins; later duplicates are unreachable

pub mod snapshot;
pub mod table;

pub use snapshot::RoutingSnapshot;
pub use table::RoutingTable;
