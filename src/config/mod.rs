//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! rule file (YAML / JSON / TOML)
//!     → loader.rs (read & deserialize, every field present and well-typed)
//!     → Vec<Rule> (all-or-nothing)
//!     → RoutingTable::set
//!
//! On change:
//!     watcher.rs receives notify event
//!     → debounce, re-register watch
//!     → loader.rs reloads
//!     → publish on success, keep last good rules on failure
//! ```

pub mod loader;
pub mod schema;
pub mod watcher;

pub use loader::{load_rules, ConfigError};
pub use schema::{LogFormat, ObservabilityConfig, Rule, ServerConfig};
pub use watcher::{ConfigWatcher, ReloadTrigger};
