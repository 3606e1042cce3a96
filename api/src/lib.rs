//! otelgate API Server
//!
//! This crate provides the gRPC and HTTP servers of the otelgate multi-tenant OTLP
//! ingestion gateway.
//!
//! # Architecture
//!
//! The server is built on Tokio and runs two listeners sharing one [`AppState`]:
//! - an OTLP gRPC server (tonic) for `TraceService`, `MetricsService` and `LogsService`,
//!   resolving the organization of every call from its metadata
//! - an HTTP server (axum) for health checks, organization lifecycle hooks and REST
//!   telemetry uploads
//!
//! # Example
//!
//! ```no_run
//! use api::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
pub mod db;
pub mod grpc;
mod routes;
mod state;

pub use config::{Config, LogFormat, StorageBackend, DEV_TOKEN_SECRET};
pub use routes::{ApiError, ErrorBody};
pub use state::AppState;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::Router;
use grpc::{AuthorityLayer, LogsServiceImpl, MetricsServiceImpl, TracesServiceImpl};
use shared::otlp::proto::collector::{
    logs::v1::logs_service_server::LogsServiceServer,
    metrics::v1::metrics_service_server::MetricsServiceServer,
    trace::v1::trace_service_server::TraceServiceServer,
};
use shared::storage::{ClickHouseSignalStore, InMemorySignalStore, SignalStore};
use shared::tenancy::{InMemoryTagStore, InMemoryTokenStore, StaticToken, TokenDigester};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted REST upload body.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Runs the otelgate server.
///
/// This function initializes the server with configuration from environment variables
/// and starts listening for incoming connections. It handles graceful shutdown on
/// SIGTERM/SIGINT signals.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The storage backend cannot be initialized
/// - A server fails to bind to the configured address
pub async fn run_server() -> Result<()> {
    let config = Config::from_env()?;
    run_server_with_config(config).await
}

/// Builds the application state described by `config`.
///
/// Access tokens and upload tags are loaded into in-memory stores, and every
/// configured organization is registered.
///
/// # Errors
///
/// Returns an error if the token secret is unusable or the storage backend cannot be
/// initialized.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let store: Arc<dyn SignalStore> = match config.storage {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory signal store");
            InMemorySignalStore::new_shared()
        }
        StorageBackend::ClickHouse => {
            let database = db::Database::new(&db::DatabaseConfig::from_env());
            database.ping().await?;
            let store = ClickHouseSignalStore::new_shared(database.client());
            store
                .ensure_schema()
                .await
                .context("Failed to create signal tables")?;
            tracing::info!("Using ClickHouse signal store");
            store
        }
    };

    if config.token_secret == DEV_TOKEN_SECRET {
        tracing::warn!("OTELGATE_TOKEN_SECRET is not set, using the development secret");
    }
    let tokens = InMemoryTokenStore::new(TokenDigester::new(&config.token_secret)?);
    for entry in &config.access_tokens {
        tokens.insert_entry(entry.clone());
    }

    let tags = InMemoryTagStore::new();
    for entry in &config.tags {
        tags.insert_entry(entry.clone());
    }

    let mut state = AppState::new(store, Arc::new(tokens), Arc::new(tags));
    if let Some(token) = &config.admin_token {
        state = state.with_admin_token(StaticToken::new(token)?);
    }

    for organization_id in &config.organizations {
        state.registry().register(organization_id.clone());
    }

    Ok(state)
}

/// Runs the otelgate server with the provided configuration.
///
/// This is useful for testing or when you want to provide configuration programmatically.
///
/// # Errors
///
/// Returns an error if:
/// - The storage backend cannot be initialized
/// - A server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server_with_config(config: Config) -> Result<()> {
    let http_addr = config.http_addr()?;
    let grpc_addr = config.grpc_addr()?;

    tracing::info!(
        host = %config.host,
        http_port = config.http_port,
        grpc_port = config.grpc_port,
        "otelgate starting"
    );

    let state = build_state(&config).await?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let app = create_router(state.clone());
    let listener = TcpListener::bind(http_addr).await?;
    tracing::info!(%http_addr, "HTTP server listening");

    let mut http_shutdown = shutdown_rx.clone();
    let http = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = http_shutdown.wait_for(|stop| *stop).await;
            })
            .await
    });

    let mut grpc_shutdown = shutdown_rx;
    let grpc = tokio::spawn(async move {
        tracing::info!(%grpc_addr, "gRPC server listening");
        tonic::transport::Server::builder()
            .layer(AuthorityLayer)
            .add_service(TraceServiceServer::new(TracesServiceImpl::new(state.clone())))
            .add_service(MetricsServiceServer::new(MetricsServiceImpl::new(state.clone())))
            .add_service(LogsServiceServer::new(LogsServiceImpl::new(state)))
            .serve_with_shutdown(grpc_addr, async move {
                let _ = grpc_shutdown.wait_for(|stop| *stop).await;
            })
            .await
    });

    shutdown_signal().await;
    let _ = shutdown_tx.send(true);

    http.await?.context("HTTP server failed")?;
    grpc.await?.context("gRPC server failed")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Creates the HTTP router with all routes and middleware.
///
/// This function is public to allow testing the router without starting a full server.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes(state.clone()))
        .merge(routes::organization_routes(state.clone()))
        .merge(
            routes::telemetry_routes(state)
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES)),
        )
        .layer(TraceLayer::new_for_http())
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
