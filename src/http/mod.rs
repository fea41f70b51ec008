//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, request ID, tracing, timeout)
//!     → /healthz → 200, never touches the routing table
//!     → everything else:
//!         request.rs (host + path-and-query)
//!         → RoutingTable::lookup
//!         → response.rs (redirect or 404)
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::RequestTarget;
pub use server::{AppState, HttpServer, HEALTHZ_PATH};
