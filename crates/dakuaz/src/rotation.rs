//! Rotation cache: compare-and-swap renewal.
//!
//! For each token identity the cache holds the binding hash of the most
//! recently accepted credential. A renewal is accepted only if it presents
//! that credential (or nothing is cached yet), and the check and the update
//! happen as one backend operation.

use std::time::Duration;

use dakuaz_core::{unix_now, Blake2bHash, Credential, TokenId};
use dakuaz_store::{KeyValueStore, SwapOutcome, SwapRequest};

use crate::backend::{bounded, DEFAULT_STORE_TIMEOUT};
use crate::encoding::{decode_hash, hash_value, token_key};
use crate::error::{AuthorityError, Result};

/// How a successful rotation was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// Nothing was cached for the token; the successor is now recorded.
    Registered,
    /// The cached hash matched the predecessor and was replaced.
    Advanced,
    /// This exact pair was already applied; nothing changed.
    AlreadyCurrent,
}

/// Rotation records over an injected key-value backend.
pub struct RotationCache<S> {
    store: S,
    timeout: Duration,
}

impl<S: KeyValueStore> RotationCache<S> {
    /// Wrap a backend with the default per-call deadline.
    pub fn new(store: S) -> Self {
        Self::with_timeout(store, DEFAULT_STORE_TIMEOUT)
    }

    /// Wrap a backend with an explicit per-call deadline.
    pub fn with_timeout(store: S, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Get the backend.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Accept `new` as the successor of `old`, or fail with
    /// [`AuthorityError::Mismatch`].
    pub async fn validate_and_advance(&self, old: &Credential, new: &Credential) -> Result<Rotation> {
        self.validate_and_advance_at(old, new, unix_now()).await
    }

    /// [`RotationCache::validate_and_advance`] with liveness evaluated at `now`.
    ///
    /// A missing record is the first rotation for the token and registers
    /// `new`. A record holding anything other than `old.hash` is a stale or
    /// replayed predecessor, unless it already holds `new.hash`, which is a
    /// retry of this same pair. The written record expires with `new`.
    pub async fn validate_and_advance_at(
        &self,
        old: &Credential,
        new: &Credential,
        now: i64,
    ) -> Result<Rotation> {
        let request = SwapRequest {
            guard_key: token_key(&old.token),
            expected: hash_value(&old.hash),
            key: token_key(&new.token),
            value: hash_value(&new.hash),
            expire_at: new.expire_at,
        };

        let outcome = bounded(
            self.timeout,
            "rotate",
            self.store.compare_and_swap(&request, now),
        )
        .await?;

        match outcome {
            SwapOutcome::Advanced { registered: true } => Ok(Rotation::Registered),
            SwapOutcome::Advanced { registered: false } => Ok(Rotation::Advanced),
            SwapOutcome::AlreadyCurrent => Ok(Rotation::AlreadyCurrent),
            SwapOutcome::Mismatch { .. } => {
                tracing::debug!(category = "mismatch", token = %old.token, "stale predecessor");
                Err(AuthorityError::Mismatch)
            }
        }
    }

    /// The hash currently recorded for `token`, if any.
    pub async fn current_hash(&self, token: &TokenId) -> Result<Option<Blake2bHash>> {
        self.current_hash_at(token, unix_now()).await
    }

    /// The hash recorded for `token` at `now`, if any.
    pub async fn current_hash_at(&self, token: &TokenId, now: i64) -> Result<Option<Blake2bHash>> {
        let key = token_key(token);
        bounded(self.timeout, "current_hash", self.store.get(&key, now))
            .await?
            .map(|value| decode_hash(&value))
            .transpose()
    }

    /// Delete every rotation record whose credential expired before `now`.
    pub async fn purge_expired_at(&self, now: i64) -> Result<usize> {
        bounded(self.timeout, "purge_rotations", self.store.purge_expired(now)).await
    }
}
