use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Failures raised by a storage backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("sqlite migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("embedded database error: {0}")]
    Embedded(#[from] redb::Error),

    #[error("corrupt stored record: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("blocking storage task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),

    #[error("storage call exceeded {0:?}")]
    Timeout(Duration),
}

/// Errors surfaced to HTTP clients
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("no mapping for id {0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("stored url for {0} is not a valid Location header")]
    UnredirectableTarget(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::InvalidBody(_) => (
                StatusCode::BAD_REQUEST,
                "Invalid request body: please provide a JSON object with a 'url' key",
            ),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Link not found"),
            AppError::Storage(_) | AppError::UnredirectableTarget(_) => {
                tracing::error!(error = %self, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
