//! Persistence for short ID -> URL mappings
//!
//! Four interchangeable backends implement [`UrlStore`]:
//! - [`MemoryStore`] - process-local map, lost on restart
//! - [`EmbeddedStore`] - single-file redb database
//! - [`SqliteStore`] / [`PostgresStore`] - relational table behind a sqlx pool
//!
//! Each store is the sole owner of its table. Callers only ever hold short IDs.

pub mod embedded;
pub mod memory;
pub mod postgres;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::UrlRecord;

pub use embedded::EmbeddedStore;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Outcome of [`UrlStore::insert`]
#[derive(Debug, Clone, PartialEq)]
pub enum Insertion {
    /// The record was written
    Created,
    /// A row with the same ID was already present and was left untouched
    AlreadyExists(UrlRecord),
}

#[async_trait]
pub trait UrlStore: Send + Sync + 'static {
    /// Inserts `record` unless its ID is already taken.
    ///
    /// An existing row is never overwritten, and concurrent inserts of the same ID
    /// must resolve to exactly one `Created`.
    async fn insert(&self, record: UrlRecord) -> Result<Insertion>;

    /// Looks up the record stored under `id`.
    async fn get(&self, id: &str) -> Result<Option<UrlRecord>>;

    /// Number of stored mappings.
    async fn count(&self) -> Result<u64>;

    /// Short name of the backend, for logs and the health endpoint.
    fn backend(&self) -> &'static str;

    /// Releases pooled resources. Called once at shutdown.
    async fn close(&self) {}
}
