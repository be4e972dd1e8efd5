//! Data models for the URL shortener
//!
//! This module defines the stored mapping record and the JSON request/response
//! bodies of the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::digest::derive_id;

/// A stored mapping from short ID to original URL
///
/// Records are immutable once written: there is no update, expiry or deletion.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct UrlRecord {
    /// 8-character short ID derived from `original_url`
    pub id: String,

    /// The destination the short link redirects to
    pub original_url: String,

    /// Timestamp of first creation
    #[sqlx(rename = "creation_date")]
    pub created_at: DateTime<Utc>,
}

impl UrlRecord {
    /// Builds a fresh record for `original_url`, deriving its ID
    pub fn new(original_url: impl Into<String>) -> Self {
        let original_url = original_url.into();
        Self {
            id: derive_id(&original_url),
            original_url,
            created_at: Utc::now(),
        }
    }
}

/// Request payload for `POST /shorten`
///
/// # Example
/// ```json
/// { "url": "https://example.com/very/long/url" }
/// ```
#[derive(Deserialize, Serialize, Debug)]
pub struct ShortenRequest {
    pub url: String,
}

/// Response returned after shortening a URL
///
/// # Example
/// ```json
/// { "short_url": "http://localhost:3000/r/c984d06a" }
/// ```
#[derive(Serialize, Deserialize, Debug)]
pub struct ShortenResponse {
    pub short_url: String,
}
