//! HTTP exporter for detector metrics.
//!
//! The detector loop is synchronous, so the exporter runs its own tokio
//! runtime on a background thread and the loop publishes snapshots
//! through a [`MetricsHandle`].

use crate::metrics::{MetricsRegistry, MetricsSnapshot};
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::JoinHandle;
use thiserror::Error;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

/// Errors that can occur during metrics server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),

    #[error("server error: {0}")]
    Server(String),
}

/// Configuration for the metrics server.
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    /// Address to bind the server to.
    pub bind_addr: SocketAddr,
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self::with_port(9464)
    }
}

impl MetricsServerConfig {
    /// Loopback address on `port`.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: ([127, 0, 0, 1], port).into(),
        }
    }
}

type SharedRegistry = Arc<RwLock<MetricsRegistry>>;

/// Cloneable handle for publishing snapshots from synchronous code.
#[derive(Clone)]
pub struct MetricsHandle {
    registry: SharedRegistry,
}

impl MetricsHandle {
    /// Applies a snapshot. Must not be called from inside an async task.
    pub fn publish(&self, snapshot: &MetricsSnapshot) {
        self.registry.blocking_read().update(snapshot);
    }
}

/// HTTP server exposing `/metrics` and `/health`.
pub struct MetricsServer {
    config: MetricsServerConfig,
    registry: SharedRegistry,
}

impl MetricsServer {
    /// Creates a new metrics server around `registry`.
    pub fn new(config: MetricsServerConfig, registry: MetricsRegistry) -> Self {
        Self {
            config,
            registry: Arc::new(RwLock::new(registry)),
        }
    }

    /// Handle for publishing snapshots.
    pub fn handle(&self) -> MetricsHandle {
        MetricsHandle {
            registry: Arc::clone(&self.registry),
        }
    }

    /// Serves until the process exits.
    pub async fn run(self) -> Result<(), ServerError> {
        let app = Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.registry);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Metrics server listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Server(e.to_string()))
    }

    /// Runs the server on a dedicated thread with its own runtime.
    pub fn spawn(self) -> JoinHandle<Result<(), ServerError>> {
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()?;
            let result = runtime.block_on(self.run());
            if let Err(ref e) = result {
                tracing::error!(error = %e, "Metrics server stopped");
            }
            result
        })
    }
}

async fn metrics_handler(State(registry): State<SharedRegistry>) -> impl IntoResponse {
    let registry = registry.read().await;

    match registry.encode() {
        Ok(output) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            output,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {}", e),
        ),
    }
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
