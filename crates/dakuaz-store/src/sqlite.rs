//! SQLite implementation of the KeyValueStore trait.
//!
//! This is the persistent backend. It uses rusqlite with bundled SQLite,
//! wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{decide_swap, KeyValueStore, SwapOutcome, SwapRequest};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|e| {
                StoreError::Database(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
                    Some(format!("mutex poisoned: {}", e)),
                ))
            })?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("spawn_blocking failed: {}", e)))?
    }
}

/// Delete `key` if its deadline has passed at `now`.
fn evict(conn: &Connection, key: &str, now: i64) -> rusqlite::Result<()> {
    conn.execute(
        "DELETE FROM entries WHERE key = ?1 AND expire_at IS NOT NULL AND expire_at < ?2",
        params![key, now],
    )?;
    Ok(())
}

fn live_value(conn: &Connection, key: &str, now: i64) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM entries
         WHERE key = ?1 AND (expire_at IS NULL OR expire_at >= ?2)",
        params![key, now],
        |row| row.get(0),
    )
    .optional()
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str, now: i64) -> Result<Option<String>> {
        let key = key.to_string();
        self.blocking(move |conn| {
            evict(conn, &key, now)?;
            Ok(live_value(conn, &key, now)?)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let key = key.to_string();
        let value = value.to_string();

        self.blocking(move |conn| {
            conn.execute(
                "INSERT INTO entries (key, value, expire_at) VALUES (?1, ?2, NULL)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, expire_at = NULL",
                params![key, value],
            )?;
            Ok(())
        })
        .await
    }

    async fn set_until(&self, key: &str, value: &str, deadline: i64) -> Result<()> {
        let key = key.to_string();
        let value = value.to_string();

        self.blocking(move |conn| {
            conn.execute(
                "INSERT INTO entries (key, value, expire_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE
                 SET value = excluded.value, expire_at = excluded.expire_at",
                params![key, value, deadline],
            )?;
            Ok(())
        })
        .await
    }

    async fn expire_at(&self, key: &str, deadline: i64) -> Result<()> {
        let key = key.to_string();

        self.blocking(move |conn| {
            conn.execute(
                "UPDATE entries SET expire_at = ?2 WHERE key = ?1",
                params![key, deadline],
            )?;
            Ok(())
        })
        .await
    }

    async fn compare_and_swap(&self, request: &SwapRequest, now: i64) -> Result<SwapOutcome> {
        let request = request.clone();

        self.blocking(move |conn| {
            // IMMEDIATE takes the write lock up front, so no other writer can
            // slip in between the read and the write.
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            evict(&tx, &request.guard_key, now)?;
            evict(&tx, &request.key, now)?;

            let guard = live_value(&tx, &request.guard_key, now)?;
            let target = if request.key == request.guard_key {
                guard.clone()
            } else {
                live_value(&tx, &request.key, now)?
            };

            let registered = match decide_swap(&request, guard.as_deref(), target.as_deref()) {
                Ok(registered) => registered,
                Err(outcome) => return Ok(outcome),
            };

            tx.execute(
                "INSERT INTO entries (key, value, expire_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE
                 SET value = excluded.value, expire_at = excluded.expire_at",
                params![request.key, request.value, request.expire_at],
            )?;
            tx.commit()?;

            Ok(SwapOutcome::Advanced { registered })
        })
        .await
    }

    async fn purge_expired(&self, now: i64) -> Result<usize> {
        let removed = self
            .blocking(move |conn| {
                Ok(conn.execute(
                    "DELETE FROM entries WHERE expire_at IS NOT NULL AND expire_at < ?1",
                    params![now],
                )?)
            })
            .await?;

        if removed > 0 {
            tracing::debug!(removed, "purged expired entries");
        }
        Ok(removed)
    }
}
