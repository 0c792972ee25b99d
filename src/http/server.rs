//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, server span, timeout)
//! - Bind server to listener
//! - Stop accepting on shutdown signal

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;

use crate::config::ServiceConfig;
use crate::downstream::UserServiceClient;
use crate::http::handlers;
use crate::http::middleware::trace_requests;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::observability::metrics::MetricsSink;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<dyn MetricsSink>,
    pub users: UserServiceClient,
    pub list_delay: Duration,
    pub lookup_delay: Duration,
}

impl AppState {
    pub fn new(config: &ServiceConfig, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            metrics,
            users: UserServiceClient::new(&config.downstream),
            list_delay: Duration::from_millis(config.simulation.list_delay_ms),
            lookup_delay: Duration::from_millis(config.simulation.lookup_delay_ms),
        }
    }
}

/// HTTP server for the product API.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig, metrics: Arc<dyn MetricsSink>) -> Self {
        let state = AppState::new(&config, metrics);
        let router = build_router(&config, state);
        Self { router, config }
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            downstream = %self.config.downstream.base_url,
            downstream_timeout_ms = self.config.downstream.timeout_ms,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
///
/// Layer order, outermost first: set request ID, propagate request ID,
/// server span, request timeout.
#[allow(deprecated)]
pub fn build_router(config: &ServiceConfig, state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/api/products", get(handlers::get_products))
        .route("/api/products/{id}", get(handlers::get_product))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(middleware::from_fn(trace_requests))
        .layer(propagate_request_id_layer())
        .layer(set_request_id_layer())
}
