//! Entry point for the bookshelf-server binary.

use std::sync::Arc;

use bookshelf_server::{AppState, LogFormat, ServerConfig, StoreBackend, build_app};
use bookshelf_store::{DisconnectedGateway, Gateway, MemoryGateway, MongoGateway};
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = ServerConfig::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level, config.log_format);

    tracing::info!("Starting bookshelf-server");
    tracing::info!(
        port = config.port,
        backend = ?config.store_backend,
        pagination = config.pagination,
        "Configuration loaded"
    );

    // Connect to the document store
    let gateway = connect_gateway(&config).await;

    // Build application
    let state = AppState::new(Arc::clone(&gateway), config.clone());
    let app = build_app(state)?;

    // Create listener
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    gateway.shutdown().await;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Build the gateway for the configured backend.
///
/// A MongoDB connection that still fails after the retry policy is used up
/// does not stop the process: the server comes up with a
/// [`DisconnectedGateway`], reports `never_connected` on `/health`, and
/// answers data routes with 503.
async fn connect_gateway(config: &ServerConfig) -> Arc<dyn Gateway> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on exit");
            Arc::new(MemoryGateway::new())
        }
        StoreBackend::MongoDb => {
            match MongoGateway::connect_with_retry(&config.store).await {
                Ok(gateway) => Arc::new(gateway),
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        attempts = config.store.retry.max_attempts,
                        "Could not connect to document store; serving without it"
                    );
                    Arc::new(DisconnectedGateway::new(e.to_string()))
                }
            }
        }
    }
}

/// Initialize the tracing subscriber.
fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
