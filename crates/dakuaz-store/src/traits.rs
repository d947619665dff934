//! KeyValueStore trait: the abstract interface for expiring records.
//!
//! Revocation and rotation records both live behind this trait, so the
//! engine never sees a concrete backend. Implementations include SQLite
//! (persistent) and in-memory (for tests).

use async_trait::async_trait;

use crate::error::Result;

/// A single compare-and-swap against the backend.
///
/// Reads `guard_key`. If it holds `expected`, or holds nothing, `key` is set
/// to `value` with deadline `expire_at`. All of it happens as one step with
/// respect to other callers of the same backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    /// Key whose current value is checked.
    pub guard_key: String,
    /// Value the guard must hold for the swap to proceed.
    pub expected: String,
    /// Key written on success.
    pub key: String,
    /// Value written on success.
    pub value: String,
    /// Absolute deadline (Unix seconds) of the written record.
    pub expire_at: i64,
}

/// Outcome of a compare-and-swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    /// The record was written.
    Advanced {
        /// True when the guard was absent (first write for this identity).
        registered: bool,
    },
    /// The guard did not match, but `key` already holds `value`: this exact
    /// swap was applied earlier. Nothing was written.
    AlreadyCurrent,
    /// The guard holds a different live value. Nothing was written.
    Mismatch {
        /// The value found under the guard key.
        current: String,
    },
}

impl SwapOutcome {
    /// True unless the outcome is a mismatch.
    pub fn is_success(&self) -> bool {
        !matches!(self, SwapOutcome::Mismatch { .. })
    }
}

/// The KeyValueStore trait: async interface for expiring records.
///
/// # Expiry
///
/// A record with deadline `d` is live while `now <= d`. Reads take the
/// caller's clock so expiry is deterministic under test. Records past their
/// deadline read as absent. Backends delete an expired record when a read
/// or swap touches its key, and [`KeyValueStore::purge_expired`] sweeps the
/// rest.
///
/// # Atomicity
///
/// [`KeyValueStore::compare_and_swap`] is the only operation with an
/// ordering guarantee across callers. Everything else is independent.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the live value of `key` at `now`.
    async fn get(&self, key: &str, now: i64) -> Result<Option<String>>;

    /// Set `key` to `value`, clearing any deadline it had.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Set `key` to `value` with an absolute deadline, as one write.
    ///
    /// The record never exists without its deadline, even if the call is
    /// abandoned midway.
    async fn set_until(&self, key: &str, value: &str, deadline: i64) -> Result<()>;

    /// Give an existing `key` an absolute deadline. A missing key is ignored.
    async fn expire_at(&self, key: &str, deadline: i64) -> Result<()>;

    /// Apply a [`SwapRequest`] atomically, evaluating liveness at `now`.
    async fn compare_and_swap(&self, request: &SwapRequest, now: i64) -> Result<SwapOutcome>;

    /// Drop every record whose deadline passed before `now`.
    ///
    /// Returns the number of records removed.
    async fn purge_expired(&self, now: i64) -> Result<usize>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: KeyValueStore {
    /// Whether `key` holds a live value at `now`.
    fn contains(
        &self,
        key: &str,
        now: i64,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;
}

impl<S: KeyValueStore + ?Sized> StoreExt for S {
    async fn contains(&self, key: &str, now: i64) -> Result<bool> {
        Ok(self.get(key, now).await?.is_some())
    }
}

/// Shared CAS decision, given the live values of the guard and target keys.
///
/// `Ok(registered)` means write; `Err` carries the outcome to report without
/// writing.
pub(crate) fn decide_swap(
    request: &SwapRequest,
    guard: Option<&str>,
    target: Option<&str>,
) -> std::result::Result<bool, SwapOutcome> {
    match guard {
        None => Ok(true),
        Some(current) if current == request.expected => Ok(false),
        Some(_) if target == Some(request.value.as_str()) => Err(SwapOutcome::AlreadyCurrent),
        Some(current) => Err(SwapOutcome::Mismatch {
            current: current.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SwapRequest {
        SwapRequest {
            guard_key: "t".into(),
            expected: "h1".into(),
            key: "t".into(),
            value: "h2".into(),
            expire_at: 100,
        }
    }

    #[test]
    fn test_decide_register_on_miss() {
        assert_eq!(decide_swap(&request(), None, None), Ok(true));
    }

    #[test]
    fn test_decide_advance_on_match() {
        assert_eq!(decide_swap(&request(), Some("h1"), Some("h1")), Ok(false));
    }

    #[test]
    fn test_decide_resubmission() {
        assert_eq!(
            decide_swap(&request(), Some("h2"), Some("h2")),
            Err(SwapOutcome::AlreadyCurrent)
        );
    }

    #[test]
    fn test_decide_stale() {
        assert_eq!(
            decide_swap(&request(), Some("h3"), Some("h3")),
            Err(SwapOutcome::Mismatch {
                current: "h3".into()
            })
        );
    }
}
