use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use super::{Insertion, Result, UrlStore};
use crate::model::UrlRecord;

/// Relational store over a single `urls` table.
///
/// The primary key on `id` is the only integrity mechanism: a losing concurrent
/// insert of the same URL sees a unique violation and reports `AlreadyExists`.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens a pool for `database_url` (e.g. "sqlite:./digestlink.db"), creating
    /// the file if needed, and applies the embedded migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations/sqlite").run(&pool).await?;
        tracing::debug!("sqlite migrations applied");

        Ok(Self { pool })
    }

    async fn fetch(&self, id: &str) -> Result<Option<UrlRecord>> {
        let record: Option<UrlRecord> = sqlx::query_as(
            "SELECT id, original_url, creation_date FROM urls WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}

#[async_trait]
impl UrlStore for SqliteStore {
    async fn insert(&self, record: UrlRecord) -> Result<Insertion> {
        let result = sqlx::query(
            "INSERT INTO urls (id, original_url, creation_date) VALUES (?1, ?2, ?3)",
        )
        .bind(&record.id)
        .bind(&record.original_url)
        .bind(record.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(Insertion::Created),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                // Rows are never deleted, so the winner is still there
                let existing = self.fetch(&record.id).await?.ok_or(sqlx::Error::RowNotFound)?;
                Ok(Insertion::AlreadyExists(existing))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, id: &str) -> Result<Option<UrlRecord>> {
        self.fetch(id).await
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
