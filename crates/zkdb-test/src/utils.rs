//! Fixtures and fault-injecting stores.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use zkdb_server::{Database, ServerConfig, ServerResult};
use zkdb_sql::StatementOutput;
use zkdb_storage::{
    BlobStore, ContentAddress, MemoryRegistry, MemoryStore, RetryPolicy, RetryingStore,
    StorageError, StorageResult,
};

/// Statements creating `users (id int, name string)` with three rows.
pub const USERS: &[&str] = &[
    "CREATE TABLE users (id int, name string)",
    "INSERT INTO users (id, name) VALUES (1, 'Alice'), (2, 'Bob'), (3, 'Carol')",
];

/// Statements creating `docs (id int, embedding list[float])` with three rows.
pub const DOCS: &[&str] = &[
    "CREATE TABLE docs (id int, embedding list[float])",
    "INSERT INTO docs (id, embedding) VALUES (1, [0.1, 0.2, 0.3]), (2, [0.4, 0.5, 0.6]), (3, [0.7, 0.8, 0.9])",
];

/// Runs each statement in order, without proofs.
pub fn run_all(db: &Database, statements: &[&str]) -> ServerResult<()> {
    for sql in statements {
        db.execute(sql, Some(false))?;
    }
    Ok(())
}

/// Runs one statement and returns its result rows as JSON.
pub fn query_json(db: &Database, sql: &str) -> ServerResult<JsonValue> {
    Ok(db.execute(sql, Some(false))?.result.to_json())
}

/// Runs one statement with a proof.
pub fn query_proved(db: &Database, sql: &str) -> ServerResult<StatementOutput> {
    db.execute(sql, Some(true))
}

/// A blob store whose reads fail transiently a set number of times.
///
/// Every `get_object` consumes one pending failure, if any, before
/// delegating to an in-memory store.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    pending_failures: AtomicU32,
    reads: AtomicU32,
    failed: Mutex<Vec<ContentAddress>>,
}

impl FlakyStore {
    /// Creates a store with no pending failures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` reads fail transiently.
    pub fn fail_next(&self, count: u32) {
        self.pending_failures.store(count, Ordering::SeqCst);
    }

    /// Returns the number of reads attempted so far.
    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Returns the addresses whose reads were failed.
    pub fn failed_addresses(&self) -> Vec<ContentAddress> {
        self.failed.lock().clone()
    }
}

impl BlobStore for FlakyStore {
    fn put_object(&self, address: &ContentAddress, bytes: &[u8]) -> StorageResult<()> {
        self.inner.put_object(address, bytes)
    }

    fn get_object(&self, address: &ContentAddress) -> StorageResult<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let consumed = self
            .pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if consumed {
            self.failed.lock().push(address.clone());
            return Err(StorageError::TransientFetch {
                address: address.clone(),
                message: "injected failure".to_string(),
            });
        }
        self.inner.get_object(address)
    }
}

/// Opens an in-memory database over `store`, retrying reads with `policy`.
pub fn db_over(store: Arc<FlakyStore>, policy: RetryPolicy) -> Database {
    Database::from_parts(
        Arc::new(RetryingStore::new(store, policy)),
        Arc::new(MemoryRegistry::new()),
        &ServerConfig::default(),
    )
}
