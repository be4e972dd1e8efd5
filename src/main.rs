//! Application entry point and server initialization
//!
//! This module contains the main function that:
//! - Loads environment configuration
//! - Opens the configured store
//! - Starts the HTTP server with graceful shutdown support

use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use digestlink::config::AppConfig;
use digestlink::database::{open_store, AppState};
use digestlink::route::create_app;
use digestlink::service::Shortener;

/// Application entry point
///
/// Configuration errors (e.g. a persistent backend without `DATABASE_URL`) are
/// returned before any socket is bound, which aborts the process.
///
/// # Environment Variables
///
/// - `PORT` - Server port number (default: 3000)
/// - `STORE_BACKEND` - `memory`, `embedded` or `sqlite` (default: sqlite)
/// - `DATABASE_URL` - Embedded database file or sqlite connection string
/// - `PUBLIC_BASE_URL` - Fixed base for generated links
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "digestlink=debug,tower_http=debug".into()),
        )
        .init();

    let config = AppConfig::from_env().inspect_err(|e| {
        tracing::error!("invalid configuration: {e:#}");
    })?;

    let store = open_store(&config).await?;
    let shortener = Shortener::new(store.clone(), config.store_timeout);
    let state = AppState::new(shortener, config.public_base_url.clone());

    let app = create_app(state).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    // The server will continue running until it receives SIGTERM or SIGINT
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("store closed, bye");

    Ok(())
}

/// Handles graceful shutdown signals
///
/// Returns once SIGINT (Ctrl+C) or, on Unix, SIGTERM is received. In-flight
/// requests are allowed to complete before the store is closed.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping server");
}
