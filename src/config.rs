use anyhow::{bail, Context, Result};
use std::time::Duration;

/// Which [`UrlStore`](crate::store::UrlStore) implementation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Embedded,
    Sqlite,
    Postgres,
}

impl StoreBackend {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "embedded" | "redb" => Ok(Self::Embedded),
            "sqlite" => Ok(Self::Sqlite),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => bail!(
                "STORE_BACKEND must be one of memory, embedded, sqlite, postgres (got {other:?})"
            ),
        }
    }

    /// Backend implied by a connection string when `STORE_BACKEND` is unset
    fn infer(database_url: Option<&str>) -> Self {
        match database_url {
            Some(url) if url.starts_with("postgres://") || url.starts_with("postgresql://") => {
                Self::Postgres
            }
            _ => Self::Sqlite,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    pub backend: StoreBackend,

    /// File path for the embedded store, connection string for sqlite/postgres.
    /// Always `Some` for the persistent backends.
    pub database_url: Option<String>,

    /// Public base URL used when building short links, e.g. "https://go.example.com".
    /// When unset the scheme and host are taken from each request.
    pub public_base_url: Option<String>,

    /// Upper bound for a single storage call
    pub store_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let backend = match lookup("STORE_BACKEND") {
            Some(value) => StoreBackend::parse(&value)?,
            None => StoreBackend::infer(database_url.as_deref()),
        };
        if backend != StoreBackend::Memory && database_url.is_none() {
            bail!("DATABASE_URL environment variable is not set");
        }

        let store_timeout_ms = lookup("STORE_TIMEOUT_MS")
            .unwrap_or_else(|| "5000".into())
            .parse::<u64>()
            .context("STORE_TIMEOUT_MS must be a number of milliseconds")?;

        let public_base_url = lookup("PUBLIC_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_owned())
            .filter(|url| !url.is_empty());

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            backend,
            database_url,
            public_base_url,
            store_timeout: Duration::from_millis(store_timeout_ms),
        })
    }
}
