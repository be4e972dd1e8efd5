//! Behaviour shared by every store backend
//!
//! Each check runs against the in-memory, embedded (redb) and sqlite stores.
//! PostgreSQL is covered when `DIGESTLINK_TEST_POSTGRES_URL` points at a
//! disposable database.

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use digestlink::digest::derive_id;
use digestlink::error::{AppError, StoreError};
use digestlink::model::UrlRecord;
use digestlink::service::Shortener;
use digestlink::store::{
    EmbeddedStore, Insertion, MemoryStore, PostgresStore, SqliteStore, UrlStore,
};

/// Opens one store of each kind. The returned directory must outlive the stores.
async fn all_stores() -> (Vec<Arc<dyn UrlStore>>, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let embedded = EmbeddedStore::open(dir.path().join("links.redb"))
        .expect("Failed to open embedded store");
    let sqlite_url = format!("sqlite://{}", dir.path().join("links.db").display());
    let sqlite = SqliteStore::connect(&sqlite_url)
        .await
        .expect("Failed to open sqlite store");

    let stores: Vec<Arc<dyn UrlStore>> = vec![
        Arc::new(MemoryStore::new()),
        Arc::new(embedded),
        Arc::new(sqlite),
    ];
    (stores, dir)
}

#[tokio::test]
async fn test_insert_then_get() {
    let (stores, _dir) = all_stores().await;

    for store in stores {
        let record = UrlRecord::new("https://example.com/round-trip");
        let id = record.id.clone();

        assert_eq!(store.insert(record.clone()).await.unwrap(), Insertion::Created);

        let found = store.get(&id).await.unwrap().expect("record should exist");
        assert_eq!(found.id, id, "{}", store.backend());
        assert_eq!(found.original_url, "https://example.com/round-trip");
        assert_eq!(
            found.created_at.timestamp(),
            record.created_at.timestamp(),
            "{}",
            store.backend()
        );
    }
}

#[tokio::test]
async fn test_second_insert_keeps_first_row() {
    let (stores, _dir) = all_stores().await;

    for store in stores {
        let first = UrlRecord::new("https://example.com/first");
        let mut impostor = first.clone();
        impostor.original_url = "https://example.com/second".to_owned();

        store.insert(first.clone()).await.unwrap();
        match store.insert(impostor).await.unwrap() {
            Insertion::AlreadyExists(existing) => {
                assert_eq!(existing.original_url, first.original_url, "{}", store.backend())
            }
            Insertion::Created => panic!("{} overwrote an existing id", store.backend()),
        }

        let stored = store.get(&first.id).await.unwrap().unwrap();
        assert_eq!(stored.original_url, "https://example.com/first");
        assert_eq!(store.count().await.unwrap(), 1, "{}", store.backend());
    }
}

#[tokio::test]
async fn test_unknown_id_is_absent() {
    let (stores, _dir) = all_stores().await;

    for store in stores {
        store.insert(UrlRecord::new("https://example.com")).await.unwrap();
        assert!(store.get("deadbeef").await.unwrap().is_none(), "{}", store.backend());
        assert!(store.get("").await.unwrap().is_none(), "{}", store.backend());
    }
}

#[tokio::test]
async fn test_same_id_across_backends() {
    let (stores, _dir) = all_stores().await;
    let url = "https://www.google.com/search?q=golang+projects";

    for store in stores {
        let shortener = Shortener::new(store.clone(), Duration::from_secs(5));
        let id = shortener.create(url).await.unwrap();

        assert_eq!(id, "3d6a2e60", "{}", store.backend());
        assert_eq!(id, derive_id(url));
        assert_eq!(shortener.resolve(&id).await.unwrap(), url);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_store_one_row() {
    let (stores, _dir) = all_stores().await;
    let url = "https://example.com/contended";

    for store in stores {
        let shortener = Shortener::new(store.clone(), Duration::from_secs(10));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let shortener = shortener.clone();
                tokio::spawn(async move { shortener.create(url).await })
            })
            .collect();

        for handle in handles {
            let id = handle.await.unwrap().expect("create should not fail");
            assert_eq!(id, derive_id(url), "{}", store.backend());
        }

        assert_eq!(store.count().await.unwrap(), 1, "{}", store.backend());
    }
}

#[tokio::test]
async fn test_embedded_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reopen.redb");

    {
        let store = EmbeddedStore::open(&path).unwrap();
        store.insert(UrlRecord::new("https://example.com/persist")).await.unwrap();
    }

    let store = EmbeddedStore::open(&path).unwrap();
    let found = store.get(&derive_id("https://example.com/persist")).await.unwrap();
    assert_eq!(found.unwrap().original_url, "https://example.com/persist");
}

#[tokio::test]
async fn test_sqlite_store_survives_reconnect() {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}", dir.path().join("reopen.db").display());

    let store = SqliteStore::connect(&url).await.unwrap();
    store.insert(UrlRecord::new("https://example.com/persist")).await.unwrap();
    store.close().await;

    let store = SqliteStore::connect(&url).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 1);
    let found = store.get(&derive_id("https://example.com/persist")).await.unwrap();
    assert_eq!(found.unwrap().original_url, "https://example.com/persist");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_embedded_store_honours_timeout_when_writer_is_blocked() {
    let dir = TempDir::new().unwrap();
    let db = Arc::new(redb::Database::create(dir.path().join("blocked.redb")).unwrap());
    let store = EmbeddedStore::from_database(db.clone()).unwrap();
    let shortener = Shortener::new(Arc::new(store), Duration::from_millis(100));

    // redb admits one writer at a time; holding this transaction stalls every insert
    let held = db.begin_write().unwrap();

    let started = std::time::Instant::now();
    let result = shortener.create("https://example.com/blocked").await;
    assert!(
        matches!(result, Err(AppError::Storage(StoreError::Timeout(_)))),
        "{result:?}"
    );
    assert!(started.elapsed() < Duration::from_secs(5));

    // Readers are not blocked by the held writer
    assert_eq!(shortener.mapping_count().await.unwrap(), 0);

    held.abort().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_postgres_store() {
    let Ok(url) = std::env::var("DIGESTLINK_TEST_POSTGRES_URL") else {
        println!("DIGESTLINK_TEST_POSTGRES_URL not set, skipping");
        return;
    };

    let store = PostgresStore::connect(&url).await.unwrap();
    let pool = sqlx::PgPool::connect(&url).await.unwrap();
    sqlx::query("TRUNCATE urls").execute(&pool).await.unwrap();

    let shortener = Shortener::new(Arc::new(store.clone()), Duration::from_secs(10));
    let google = "https://www.google.com/search?q=golang+projects";
    assert_eq!(shortener.create(google).await.unwrap(), "3d6a2e60");
    assert_eq!(shortener.resolve("3d6a2e60").await.unwrap(), google);
    assert!(store.get("deadbeef").await.unwrap().is_none());

    let mut impostor = UrlRecord::new(google);
    impostor.original_url = "https://example.com/impostor".to_owned();
    assert!(matches!(
        store.insert(impostor).await.unwrap(),
        Insertion::AlreadyExists(existing) if existing.original_url == google
    ));

    let contended = "https://example.com/contended";
    let handles: Vec<_> = (0..32)
        .map(|_| {
            let shortener = shortener.clone();
            tokio::spawn(async move { shortener.create(contended).await })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), derive_id(contended));
    }

    assert_eq!(store.count().await.unwrap(), 2);
    store.close().await;
}
