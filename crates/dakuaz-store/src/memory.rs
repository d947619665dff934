//! In-memory implementation of the KeyValueStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence. Two hooks let tests
//! simulate a failing or slow backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::traits::{decide_swap, KeyValueStore, SwapOutcome, SwapRequest};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
    available: AtomicBool,
    latency_ms: AtomicU64,
}

struct MemoryStoreInner {
    entries: HashMap<String, StoredEntry>,
}

struct StoredEntry {
    value: String,
    expire_at: Option<i64>,
}

impl StoredEntry {
    fn is_live(&self, now: i64) -> bool {
        self.expire_at.map_or(true, |deadline| now <= deadline)
    }
}

impl MemoryStoreInner {
    /// Delete `key` if its deadline has passed at `now`.
    fn evict(&mut self, key: &str, now: i64) {
        if self.entries.get(key).is_some_and(|e| !e.is_live(now)) {
            self.entries.remove(key);
        }
    }

    fn value(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.value.as_str())
    }

    fn write(&mut self, key: &str, value: &str, expire_at: Option<i64>) {
        self.entries.insert(
            key.to_string(),
            StoredEntry {
                value: value.to_string(),
                expire_at,
            },
        );
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                entries: HashMap::new(),
            }),
            available: AtomicBool::new(true),
            latency_ms: AtomicU64::new(0),
        }
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`]
    /// (`false`) or succeed again (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Delay every subsequent call by `latency` before it touches the data.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of stored records, live or not.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().entries.len()
    }

    /// True when no records are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn gate(&self) -> Result<()> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if !self.available.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "memory store marked unavailable".into(),
            ));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str, now: i64) -> Result<Option<String>> {
        self.gate().await?;
        let mut inner = self.inner.write().unwrap();
        inner.evict(key, now);
        Ok(inner.value(key).map(str::to_string))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.gate().await?;
        self.inner.write().unwrap().write(key, value, None);
        Ok(())
    }

    async fn set_until(&self, key: &str, value: &str, deadline: i64) -> Result<()> {
        self.gate().await?;
        self.inner.write().unwrap().write(key, value, Some(deadline));
        Ok(())
    }

    async fn expire_at(&self, key: &str, deadline: i64) -> Result<()> {
        self.gate().await?;
        let mut inner = self.inner.write().unwrap();
        if let Some(entry) = inner.entries.get_mut(key) {
            entry.expire_at = Some(deadline);
        }
        Ok(())
    }

    async fn compare_and_swap(&self, request: &SwapRequest, now: i64) -> Result<SwapOutcome> {
        self.gate().await?;
        let mut inner = self.inner.write().unwrap();
        inner.evict(&request.guard_key, now);
        inner.evict(&request.key, now);

        let decision = decide_swap(
            request,
            inner.value(&request.guard_key),
            inner.value(&request.key),
        );
        let registered = match decision {
            Ok(registered) => registered,
            Err(outcome) => return Ok(outcome),
        };

        inner.write(&request.key, &request.value, Some(request.expire_at));
        Ok(SwapOutcome::Advanced { registered })
    }

    async fn purge_expired(&self, now: i64) -> Result<usize> {
        self.gate().await?;
        let mut inner = self.inner.write().unwrap();
        let before = inner.entries.len();
        inner.entries.retain(|_, e| e.is_live(now));
        Ok(before - inner.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StoreExt;

    fn swap(expected: &str, value: &str, expire_at: i64) -> SwapRequest {
        SwapRequest {
            guard_key: "token".into(),
            expected: expected.into(),
            key: "token".into(),
            value: value.into(),
            expire_at,
        }
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k", 0).await.unwrap(), None);

        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k", 0).await.unwrap().as_deref(), Some("v"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_deadline_inclusive() {
        let store = MemoryStore::new();
        store.set_until("k", "v", 100).await.unwrap();

        assert!(store.get("k", 100).await.unwrap().is_some());
        assert!(store.get("k", 101).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_clears_deadline() {
        let store = MemoryStore::new();
        store.set_until("k", "v", 10).await.unwrap();
        store.set("k", "w").await.unwrap();
        assert_eq!(store.get("k", 1_000).await.unwrap().as_deref(), Some("w"));
    }

    #[tokio::test]
    async fn test_expire_missing_key_is_noop() {
        let store = MemoryStore::new();
        store.expire_at("nope", 10).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_memory_store_cas() {
        let store = MemoryStore::new();

        let first = store.compare_and_swap(&swap("h1", "h2", 100), 0).await.unwrap();
        assert_eq!(first, SwapOutcome::Advanced { registered: true });

        let replay = store.compare_and_swap(&swap("h1", "h3", 100), 0).await.unwrap();
        assert_eq!(
            replay,
            SwapOutcome::Mismatch {
                current: "h2".into()
            }
        );

        let again = store.compare_and_swap(&swap("h1", "h2", 100), 0).await.unwrap();
        assert_eq!(again, SwapOutcome::AlreadyCurrent);

        let next = store.compare_and_swap(&swap("h2", "h3", 200), 0).await.unwrap();
        assert_eq!(next, SwapOutcome::Advanced { registered: false });
    }

    #[tokio::test]
    async fn test_cas_after_expiry_registers() {
        let store = MemoryStore::new();
        store.compare_and_swap(&swap("h1", "h2", 100), 0).await.unwrap();

        let late = store.compare_and_swap(&swap("h9", "h10", 300), 101).await.unwrap();
        assert_eq!(late, SwapOutcome::Advanced { registered: true });
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = MemoryStore::new();
        store.set_until("a", "1", 10).await.unwrap();
        store.set_until("b", "2", 20).await.unwrap();
        store.set("c", "3").await.unwrap();

        assert_eq!(store.purge_expired(15).await.unwrap(), 1);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_hook() {
        let store = MemoryStore::new();
        store.set_available(false);
        assert!(matches!(
            store.get("k", 0).await,
            Err(StoreError::Unavailable(_))
        ));

        store.set_available(true);
        assert!(store.get("k", 0).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_hook() {
        let store = MemoryStore::new();
        store.set_latency(Duration::from_secs(5));

        let started = tokio::time::Instant::now();
        store.set("k", "v").await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_expired_read_deletes_record() {
        let store = MemoryStore::new();
        store.set_until("k", "v", 100).await.unwrap();
        store.set("other", "w").await.unwrap();

        assert!(store.contains("k", 100).await.unwrap());
        assert_eq!(store.len(), 2);

        assert!(!store.contains("k", 101).await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_cas_deletes_expired_guard() {
        let store = MemoryStore::new();
        store.set_until("gone", "x", 50).await.unwrap();

        let mut req = swap("h1", "h2", 100);
        req.guard_key = "gone".into();
        req.key = "other".into();

        let outcome = store.compare_and_swap(&req, 101).await.unwrap();
        assert_eq!(outcome, SwapOutcome::Advanced { registered: true });
        assert!(store.inner.read().unwrap().value("gone").is_none());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_set_until_writes_nothing() {
        let store = MemoryStore::new();
        store.set_latency(Duration::from_millis(60));

        let abandoned =
            tokio::time::timeout(Duration::from_millis(30), store.set_until("k", "v", 100)).await;
        assert!(abandoned.is_err());
        assert!(store.is_empty());

        store.set_until("k", "v", 100).await.unwrap();
        assert!(store.get("k", 101).await.unwrap().is_none());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn block_on<F: std::future::Future>(fut: F) -> F::Output {
            tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap()
                .block_on(fut)
        }

        proptest! {
            #[test]
            fn prop_live_until_deadline(deadline in any::<i64>(), now in any::<i64>()) {
                let live = block_on(async {
                    let store = MemoryStore::new();
                    store.set_until("k", "v", deadline).await.unwrap();
                    store.get("k", now).await.unwrap().is_some()
                });
                prop_assert_eq!(live, now <= deadline);
            }

            #[test]
            fn prop_cas_chain_rejects_every_stale_guard(len in 1usize..12, stale in 0usize..12) {
                let outcome = block_on(async {
                    let store = MemoryStore::new();
                    for i in 0..len {
                        let req = swap(&format!("h{}", i), &format!("h{}", i + 1), 1_000);
                        assert!(store.compare_and_swap(&req, 0).await.unwrap().is_success());
                    }
                    let attempt = swap(&format!("h{}", stale), "fresh", 1_000);
                    store.compare_and_swap(&attempt, 0).await.unwrap()
                });
                prop_assert_eq!(outcome.is_success(), stale == len);
            }
        }
    }
}
