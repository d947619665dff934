//! Revocation store: early invalidation of credentials.
//!
//! A revocation record maps a token identity to the binding hash of the
//! revoked credential. Its deadline is the credential's own expiry, so the
//! record disappears exactly when the credential would have expired anyway.

use std::time::Duration;

use dakuaz_core::{unix_now, Credential, TokenId};
use dakuaz_store::{KeyValueStore, StoreExt};

use crate::backend::{bounded, DEFAULT_STORE_TIMEOUT};
use crate::encoding::{hash_value, token_key};
use crate::error::Result;

/// Revocation records over an injected key-value backend.
pub struct RevocationStore<S> {
    store: S,
    timeout: Duration,
}

impl<S: KeyValueStore> RevocationStore<S> {
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

    /// Record `credential` as revoked until its `expire_at`.
    ///
    /// The value and its deadline are written together, so a failed or
    /// timed-out call never leaves a record that outlives the credential.
    pub async fn revoke(&self, credential: &Credential) -> Result<()> {
        let key = token_key(&credential.token);
        let value = hash_value(&credential.hash);

        bounded(
            self.timeout,
            "revoke",
            self.store.set_until(&key, &value, credential.expire_at),
        )
        .await?;

        tracing::debug!(token = %credential.token, expire_at = credential.expire_at, "revoked");
        Ok(())
    }

    /// Whether `token` has a live revocation record now.
    pub async fn is_revoked(&self, token: &TokenId) -> Result<bool> {
        self.is_revoked_at(token, unix_now()).await
    }

    /// Whether `token` has a live revocation record at `now`.
    pub async fn is_revoked_at(&self, token: &TokenId, now: i64) -> Result<bool> {
        let key = token_key(token);
        bounded(self.timeout, "is_revoked", self.store.contains(&key, now)).await
    }

    /// Delete every revocation record whose credential expired before `now`.
    pub async fn purge_expired_at(&self, now: i64) -> Result<usize> {
        bounded(self.timeout, "purge_revocations", self.store.purge_expired(now)).await
    }
}
