//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load rules (fatal on error) → RoutingTable → ConfigWatcher → bind listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → stop accepting → drain (bounded) → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//!     SIGHUP → immediate rule reload
//! ```
//!
//! # Design Decisions
//! - Ordered startup: rules first, then watcher, then listener
//! - Traffic is only accepted once a valid rule set is installed
//! - Shutdown has a deadline: connections are dropped after the grace period

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{Service, StartupError};
