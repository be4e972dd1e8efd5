//! Store bootstrap and shared application state
//!
//! This module turns the configured backend into a ready [`UrlStore`] and defines
//! the state handed to every request handler.

use anyhow::Context;
use std::sync::Arc;

use crate::config::{AppConfig, StoreBackend};
use crate::service::Shortener;
use crate::store::{EmbeddedStore, MemoryStore, PostgresStore, SqliteStore, UrlStore};

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub shortener: Shortener,

    /// Fixed base for generated links; `None` derives it from the request
    pub public_base_url: Option<String>,
}

impl AppState {
    pub fn new(shortener: Shortener, public_base_url: Option<String>) -> Self {
        Self {
            shortener,
            public_base_url,
        }
    }
}

/// Opens the store selected by `config.backend`
///
/// Persistent backends create their table on first use.
pub async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn UrlStore>> {
    let store: Arc<dyn UrlStore> = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Embedded => {
            let path = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must point at the embedded database file")?;
            let store = EmbeddedStore::open(path)
                .with_context(|| format!("Unable to open embedded database at {path}"))?;
            Arc::new(store)
        }
        StoreBackend::Sqlite => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be a sqlite connection string")?;
            let store = SqliteStore::connect(url)
                .await
                .context("Unable to connect to the sqlite database")?;
            Arc::new(store)
        }
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be a postgres connection string")?;
            let store = PostgresStore::connect(url)
                .await
                .context("Unable to connect to the postgres database")?;
            Arc::new(store)
        }
    };

    tracing::info!(backend = store.backend(), "store ready");
    Ok(store)
}
