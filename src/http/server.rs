//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum Router with the liveness and redirect handlers
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve until shutdown, then drain in-flight requests for a bounded
//!   grace period

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderName, Method, Request, Uri},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::schema::ServerConfig;
use crate::http::request::RequestTarget;
use crate::http::response;
use crate::observability::metrics::{self, Outcome};
use crate::routing::RoutingTable;

/// Liveness endpoint; answered without consulting the routing table.
pub const HEALTHZ_PATH: &str = "/healthz";

const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RoutingTable>,
}

/// HTTP server for the redirect service.
pub struct HttpServer {
    router: Router,
    shutdown_grace: Duration,
}

impl HttpServer {
    /// Create a new HTTP server serving lookups from `table`.
    pub fn new(table: Arc<RoutingTable>, config: &ServerConfig) -> Self {
        let router = Self::build_router(config, AppState { table });
        Self {
            router,
            shutdown_grace: config.shutdown_grace(),
        }
    }

    /// Build the axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route(HEALTHZ_PATH, any(healthz_handler))
            .fallback(redirect_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        let request_id = request
                            .headers()
                            .get(&X_REQUEST_ID)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("unknown");
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id = %request_id,
                        )
                    }))
                    .layer(TimeoutLayer::new(config.request_timeout()))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// The router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires.
    ///
    /// After the signal the listener stops accepting; in-flight requests get
    /// the configured grace period before the remaining connections are
    /// dropped.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let mut drain = shutdown.resubscribe();
        let serve = axum::serve(listener, self.router).with_graceful_shutdown(async move {
            let _ = drain.recv().await;
        });
        let mut server = tokio::spawn(async move { serve.await });

        tokio::select! {
            result = &mut server => return flatten(result),
            _ = shutdown.recv() => {}
        }

        tracing::info!(grace = ?self.shutdown_grace, "Draining in-flight requests");
        match tokio::time::timeout(self.shutdown_grace, &mut server).await {
            Ok(result) => flatten(result)?,
            Err(_) => {
                tracing::warn!(grace = ?self.shutdown_grace, "Grace period elapsed, closing remaining connections");
                server.abort();
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn flatten(
    result: Result<Result<(), std::io::Error>, tokio::task::JoinError>,
) -> Result<(), std::io::Error> {
    match result {
        Ok(inner) => inner,
        Err(e) => Err(std::io::Error::other(e)),
    }
}

async fn healthz_handler() -> Response {
    response::healthy()
}

/// Looks up the request host and redirects, or answers 404.
async fn redirect_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let target = RequestTarget::from_parts(&headers, &uri);

    match state.table.lookup(&target.host) {
        Some(rule) => {
            tracing::debug!(
                host = %target.host,
                to = %rule.to,
                status = rule.status,
                "Redirecting"
            );
            metrics::record_request(Outcome::Redirect);
            response::redirect(&rule, &target.path_and_query, &method)
        }
        None => {
            tracing::debug!(host = %target.host, "No rule for host");
            metrics::record_request(Outcome::NotFound);
            response::not_found()
        }
    }
}
