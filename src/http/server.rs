//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the issue and health routes
//! - Wire up middleware (request id, tracing, timeout, body limit, metrics)
//! - Serve on a listener until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::TrackerConfig;
use crate::http::handlers::{create_issue, delete_issue, health, list_issues, update_issue};
use crate::http::middleware::metrics::track_requests;
use crate::http::request::make_request_span;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::store::{IssueStore, StoreError, StoreResult};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn IssueStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn IssueStore>) -> Self {
        Self { store }
    }

    /// Run a store operation on the blocking pool.
    ///
    /// The store may touch the filesystem, so calls never run on a runtime
    /// worker thread.
    pub async fn with_store<T, F>(&self, op: &'static str, f: F) -> StoreResult<T>
    where
        F: FnOnce(&dyn IssueStore) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        let result = tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .unwrap_or_else(|e| Err(StoreError::Task(e.to_string())));
        metrics::record_store_op(op, result.is_ok());
        result
    }
}

/// HTTP server for the issue tracker.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server over `store` using the given configuration.
    pub fn new(config: &TrackerConfig, store: Arc<dyn IssueStore>) -> Self {
        let router = Self::build_router(config, AppState::new(store));
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &TrackerConfig, state: AppState) -> Router {
        Router::new()
            .route(
                "/api/issues/{project}",
                get(list_issues)
                    .post(create_issue)
                    .put(update_issue)
                    .delete(delete_issue),
            )
            .route("/health", get(health))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
            .layer(middleware::from_fn(track_requests))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The configured router, for serving or for driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
