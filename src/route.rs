//! Route definitions for the URL shortener API
//!
//! This module configures all HTTP routes and maps them to their respective handlers.

use axum::routing::{get, post};
use axum::Router;

use crate::database::AppState;
use crate::handler::{health, index, redirect_url, shorten_url};

/// Creates and configures the Axum application router with all routes
///
/// # Route Definitions
///
/// - `GET /` - Static welcome message
/// - `GET /health` - Liveness and store reachability
/// - `POST /shorten` - Creates a short URL (other methods get 405)
/// - `GET /r/{id}` - Redirects to the original URL
///
/// # Example Usage
///
/// ```no_run
/// # use std::{sync::Arc, time::Duration};
/// # use digestlink::database::AppState;
/// # use digestlink::route::create_app;
/// # use digestlink::service::Shortener;
/// # use digestlink::store::MemoryStore;
/// let shortener = Shortener::new(Arc::new(MemoryStore::new()), Duration::from_secs(5));
/// let app = create_app(AppState::new(shortener, None));
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/shorten", post(shorten_url))
        .route("/r/{id}", get(redirect_url))
        .with_state(state)
}
