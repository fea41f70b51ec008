//! Hostname-based HTTP redirect service with a hot-reloadable routing table.

pub mod cli;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::{Rule, ServerConfig};
pub use http::HttpServer;
pub use lifecycle::{Service, Shutdown};
pub use routing::RoutingTable;
