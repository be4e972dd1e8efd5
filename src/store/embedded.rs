//! Embedded redb backend
//!
//! The whole mapping lives in one redb table keyed by short ID. Values are the
//! JSON-serialized [`UrlRecord`].

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;
use std::sync::Arc;

use super::{Insertion, Result, UrlStore};
use crate::model::UrlRecord;

/// Main table for storing URL records
///
/// Key: short ID, e.g. "c984d06a"
/// Value: '{"id":"c984d06a","original_url":"https://example.com","created_at":...}'
pub const TABLE_URLS: TableDefinition<&str, &str> = TableDefinition::new("urls_v1");

/// redb-backed store
///
/// redb is synchronous, so every transaction runs on tokio's blocking pool. A
/// stalled commit then occupies a blocking thread instead of a worker, and the
/// caller's timeout still fires.
#[derive(Clone)]
pub struct EmbeddedStore {
    db: Arc<Database>,
}

impl EmbeddedStore {
    /// Creates or opens the database file at `path` and makes sure the table exists
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use digestlink::store::EmbeddedStore;
    /// let store = EmbeddedStore::open("data.redb").expect("Failed to open database");
    /// ```
    pub fn open(path: impl AsRef<Path>) -> std::result::Result<Self, redb::Error> {
        Self::from_database(Arc::new(Database::create(path)?))
    }

    /// Wraps an already opened database, creating the table if needed
    pub fn from_database(db: Arc<Database>) -> std::result::Result<Self, redb::Error> {
        // Opening the table inside a write transaction creates it on first run
        let write_txn = db.begin_write()?;
        write_txn.open_table(TABLE_URLS)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    async fn blocking<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || work(&db)).await?
    }
}

fn insert_record(db: &Database, record: &UrlRecord) -> Result<Insertion> {
    let encoded = serde_json::to_string(record)?;

    // redb allows a single write transaction at a time, which makes the
    // check and the insert below atomic with respect to other writers
    let write_txn = db.begin_write().map_err(redb::Error::from)?;
    let existing = {
        let mut table = write_txn.open_table(TABLE_URLS).map_err(redb::Error::from)?;
        let existing = match table.get(record.id.as_str()).map_err(redb::Error::from)? {
            Some(value) => Some(serde_json::from_str::<UrlRecord>(value.value())?),
            None => None,
        };
        if existing.is_none() {
            table
                .insert(record.id.as_str(), encoded.as_str())
                .map_err(redb::Error::from)?;
        }
        existing
    };

    match existing {
        Some(existing) => {
            write_txn.abort().map_err(redb::Error::from)?;
            Ok(Insertion::AlreadyExists(existing))
        }
        None => {
            write_txn.commit().map_err(redb::Error::from)?;
            Ok(Insertion::Created)
        }
    }
}

fn get_record(db: &Database, id: &str) -> Result<Option<UrlRecord>> {
    let read_txn = db.begin_read().map_err(redb::Error::from)?;
    let table = read_txn.open_table(TABLE_URLS).map_err(redb::Error::from)?;

    let record = match table.get(id).map_err(redb::Error::from)? {
        Some(value) => Some(serde_json::from_str(value.value())?),
        None => None,
    };
    Ok(record)
}

fn count_records(db: &Database) -> Result<u64> {
    let read_txn = db.begin_read().map_err(redb::Error::from)?;
    let table = read_txn.open_table(TABLE_URLS).map_err(redb::Error::from)?;
    Ok(table.len().map_err(redb::Error::from)?)
}

#[async_trait]
impl UrlStore for EmbeddedStore {
    async fn insert(&self, record: UrlRecord) -> Result<Insertion> {
        self.blocking(move |db| insert_record(db, &record)).await
    }

    async fn get(&self, id: &str) -> Result<Option<UrlRecord>> {
        let id = id.to_owned();
        self.blocking(move |db| get_record(db, &id)).await
    }

    async fn count(&self) -> Result<u64> {
        self.blocking(count_records).await
    }

    fn backend(&self) -> &'static str {
        "embedded"
    }
}
