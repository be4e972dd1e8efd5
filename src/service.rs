//! Shortening and resolution on top of a [`UrlStore`]
//!
//! Every store call made here is bounded by the configured timeout. Dropping
//! the future (e.g. when the client disconnects) cancels the call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::digest::is_well_formed_id;
use crate::error::{AppError, StoreError};
use crate::model::UrlRecord;
use crate::store::{Insertion, UrlStore};

#[derive(Clone)]
pub struct Shortener {
    store: Arc<dyn UrlStore>,
    timeout: Duration,
}

impl Shortener {
    pub fn new(store: Arc<dyn UrlStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn store(&self) -> &Arc<dyn UrlStore> {
        &self.store
    }

    /// Stores a mapping for `original_url` and returns its short ID
    ///
    /// Submitting the same URL again returns the same ID without writing anything.
    /// If the ID is already held by a *different* URL (a digest collision), the
    /// first mapping is kept and its ID is returned.
    pub async fn create(&self, original_url: &str) -> Result<String, AppError> {
        let record = UrlRecord::new(original_url);
        let id = record.id.clone();

        match self.bounded(self.store.insert(record)).await? {
            Insertion::Created => {
                tracing::info!(%id, url = original_url, "created short link");
            }
            Insertion::AlreadyExists(existing) if existing.original_url != original_url => {
                tracing::warn!(
                    %id,
                    stored = %existing.original_url,
                    submitted = original_url,
                    "short id collision, keeping first mapping"
                );
            }
            Insertion::AlreadyExists(_) => {
                tracing::debug!(%id, "short link already exists");
            }
        }

        Ok(id)
    }

    /// Returns the original URL stored under `id`
    pub async fn resolve(&self, id: &str) -> Result<String, AppError> {
        if !is_well_formed_id(id) {
            return Err(AppError::NotFound(id.to_owned()));
        }

        self.bounded(self.store.get(id))
            .await?
            .map(|record| record.original_url)
            .ok_or_else(|| AppError::NotFound(id.to_owned()))
    }

    /// Number of stored mappings
    pub async fn mapping_count(&self) -> Result<u64, AppError> {
        Ok(self.bounded(self.store.count()).await?)
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
    }
}
