//! HTTP request handlers for the URL shortener API
//!
//! - `POST /shorten` creates (or reuses) a mapping and returns the short link
//! - `GET /r/{id}` redirects to the original URL
//! - `GET /` and `GET /health` carry no domain behavior

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use percent_encoding::{utf8_percent_encode, CONTROLS};
use serde_json::json;

use crate::database::AppState;
use crate::error::AppError;
use crate::model::{ShortenRequest, ShortenResponse};

/// Path segment that prefixes every short link
pub const REDIRECT_PREFIX: &str = "r";

/// Static welcome message served at the root path
pub async fn index() -> &'static str {
    "URL shortener is running. POST {\"url\": \"...\"} to /shorten to create a short link."
}

/// Liveness plus a cheap store round-trip
pub async fn health(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mappings = state.shortener.mapping_count().await?;

    Ok(Json(json!({
        "status": "ok",
        "backend": state.shortener.store().backend(),
        "mappings": mappings,
    })))
}

/// Creates a short URL
///
/// The body is decoded by hand rather than through the `Json` extractor so that
/// every malformed payload (bad JSON, wrong content type, missing or empty `url`)
/// is reported as **400 Bad Request**.
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/very/long/url" }
/// ```
///
/// # Response
///
/// - **201 Created** - `{"short_url": "http://host/r/c984d06a"}`
/// - **400 Bad Request** - malformed body
/// - **500 Internal Server Error** - storage failure
pub async fn shorten_url(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload: ShortenRequest =
        serde_json::from_slice(&body).map_err(|e| AppError::InvalidBody(e.to_string()))?;
    if payload.url.is_empty() {
        return Err(AppError::InvalidBody("url must not be empty".to_owned()));
    }

    let id = state.shortener.create(&payload.url).await?;

    let base_url = match &state.public_base_url {
        Some(base) => base.clone(),
        None => request_base_url(&headers),
    };
    let response = ShortenResponse {
        short_url: short_link(&base_url, &id),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Redirects a short URL to its original destination
///
/// # Response
///
/// - **302 Found** - `Location` set to the original URL
/// - **404 Not Found** - unknown id
///
/// Stored URLs are arbitrary strings, so control characters and non-ASCII bytes
/// are percent-encoded to keep `Location` a valid header value.
pub async fn redirect_url(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let original_url = state.shortener.resolve(&id).await?;

    let location = location_header(&original_url)
        .map_err(|_| AppError::UnredirectableTarget(id.clone()))?;

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

fn location_header(url: &str) -> Result<HeaderValue, header::InvalidHeaderValue> {
    HeaderValue::from_str(&utf8_percent_encode(url, CONTROLS).to_string())
}

/// `{base_url}/r/{id}`
pub fn short_link(base_url: &str, id: &str) -> String {
    format!("{}/{}/{}", base_url, REDIRECT_PREFIX, id)
}

/// Rebuilds `scheme://host` from the inbound request
///
/// The scheme is `https` only when a proxy says so via `X-Forwarded-Proto`.
fn request_base_url(headers: &HeaderMap) -> String {
    let scheme = match headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
    {
        Some(proto) if proto.eq_ignore_ascii_case("https") => "https",
        _ => "http",
    };

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or("localhost");

    format!("{}://{}", scheme, host)
}
