//! The Authority: unified API for the Dakuaz credential engine.
//!
//! The Authority holds the signing seed, an optional transport password and
//! two injected backends: one for revocation records and one for rotation
//! records. Core operations are pure; only revocation and rotation touch
//! shared state.

use std::sync::atomic::{AtomicI64, Ordering};

use dakuaz_cipher::{open_record, seal};
use dakuaz_core::{
    unix_now, Credential, CredentialBuilder, Level, SigningSeed, TokenId, CREDENTIAL_SIZE,
};
use dakuaz_store::KeyValueStore;

use crate::config::AuthorityConfig;
use crate::error::{AuthorityError, Result};
use crate::revocation::RevocationStore;
use crate::rotation::{Rotation, RotationCache};

/// Records removed by one sweep of both backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Purged {
    pub revocations: usize,
    pub rotations: usize,
}

/// The main Authority struct.
///
/// Provides a unified API for:
/// - Issuing credentials
/// - Exporting and importing wire records (optionally sealed)
/// - Verification and level checks
/// - Revocation
/// - Renewal with rotation
pub struct Authority<R, C> {
    /// Ed448 seed used to sign and verify.
    seed: SigningSeed,
    /// Password for sealing exported records, if any.
    transport_password: Option<Vec<u8>>,
    /// Revocation records.
    revocations: RevocationStore<R>,
    /// Rotation records.
    rotations: RotationCache<C>,
    /// Configuration.
    config: AuthorityConfig,
    /// Caller clock of the last sweep.
    last_sweep: AtomicI64,
}

impl<R: KeyValueStore, C: KeyValueStore> Authority<R, C> {
    /// Create a new authority.
    pub fn new(seed: SigningSeed, revocations: R, rotations: C, config: AuthorityConfig) -> Self {
        let timeout = config.store_timeout;
        Self {
            seed,
            transport_password: None,
            revocations: RevocationStore::with_timeout(revocations, timeout),
            rotations: RotationCache::with_timeout(rotations, timeout),
            config,
            last_sweep: AtomicI64::new(i64::MIN),
        }
    }

    /// Seal exported records under `password` and open imported ones with it.
    pub fn with_transport_password(mut self, password: impl Into<Vec<u8>>) -> Self {
        self.transport_password = Some(password.into());
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &AuthorityConfig {
        &self.config
    }

    /// Get the revocation store.
    pub fn revocations(&self) -> &RevocationStore<R> {
        &self.revocations
    }

    /// Get the rotation cache.
    pub fn rotations(&self) -> &RotationCache<C> {
        &self.rotations
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Issuance and Transport
    // ─────────────────────────────────────────────────────────────────────────

    /// Issue a credential valid for `duration_secs` from now.
    pub fn issue(
        &self,
        principal: &str,
        class: i8,
        level: Level,
        duration_secs: i64,
    ) -> Result<Credential> {
        self.issue_at(principal, class, level, duration_secs, unix_now())
    }

    /// Issue a credential valid for `duration_secs` from `now`.
    pub fn issue_at(
        &self,
        principal: &str,
        class: i8,
        level: Level,
        duration_secs: i64,
        now: i64,
    ) -> Result<Credential> {
        let credential = CredentialBuilder::new(principal)
            .class(class)
            .level(level)
            .expire_at(now.saturating_add(duration_secs))
            .sign(&self.seed)?;

        tracing::debug!(token = %credential.token, class, level = %level, "issued");
        Ok(credential)
    }

    /// Serialize a credential, sealing it if a transport password is set.
    pub fn export(&self, credential: &Credential) -> Vec<u8> {
        let record = credential.to_bytes();
        match &self.transport_password {
            Some(password) => seal(&record, password),
            None => record.to_vec(),
        }
    }

    /// Inverse of [`Authority::export`]. No signature check is performed.
    pub fn import(&self, bytes: &[u8]) -> Result<Credential> {
        let credential = match &self.transport_password {
            Some(password) => {
                let record: [u8; CREDENTIAL_SIZE] = open_record(bytes, password)?;
                Credential::from_bytes(&record)?
            }
            None => Credential::from_bytes(bytes)?,
        };
        Ok(credential)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Verify a credential now.
    pub async fn verify(&self, credential: &Credential) -> Result<()> {
        self.verify_at(credential, unix_now()).await
    }

    /// Verify signature, then expiry, then revocation, at `now`.
    ///
    /// The first failing check is reported. An authentic but expired
    /// credential reports [`AuthorityError::Expired`].
    pub async fn verify_at(&self, credential: &Credential, now: i64) -> Result<()> {
        let verdict = self
            .check(credential, now, self.config.verify_revocation)
            .await
            .map_err(|e| rejected(credential, e));
        self.sweep_if_due(now).await;
        verdict
    }

    /// Verify a credential, then require every bit of every level in
    /// `required`.
    pub async fn authorize(&self, credential: &Credential, required: &[Level]) -> Result<()> {
        self.authorize_at(credential, required, unix_now()).await
    }

    /// [`Authority::authorize`] at `now`.
    pub async fn authorize_at(
        &self,
        credential: &Credential,
        required: &[Level],
        now: i64,
    ) -> Result<()> {
        self.verify_at(credential, now).await?;

        if credential.level.satisfies(required) {
            return Ok(());
        }
        let wanted = Level::compose(required.iter().copied());
        let missing = Level(wanted.bits() & !credential.level.bits());
        Err(rejected(credential, AuthorityError::Unauthorized { missing }))
    }

    async fn check(
        &self,
        credential: &Credential,
        now: i64,
        consult_revocations: bool,
    ) -> Result<()> {
        credential.verify_signature(&self.seed)?;
        credential.check_expiry_at(now)?;

        if consult_revocations
            && self
                .revocations
                .is_revoked_at(&credential.token, now)
                .await?
        {
            return Err(AuthorityError::Revoked);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Revocation
    // ─────────────────────────────────────────────────────────────────────────

    /// Revoke an authentic credential until its natural expiry.
    pub async fn revoke(&self, credential: &Credential) -> Result<()> {
        credential
            .verify_signature(&self.seed)
            .map_err(|e| rejected(credential, e.into()))?;
        self.revocations.revoke(credential).await
    }

    /// Whether `token` is revoked now.
    pub async fn is_revoked(&self, token: &TokenId) -> Result<bool> {
        self.revocations.is_revoked(token).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Renewal
    // ─────────────────────────────────────────────────────────────────────────

    /// Renew a credential for `duration_secs` from now.
    pub async fn renew(
        &self,
        credential: &Credential,
        duration_secs: i64,
        class: i8,
        level: Level,
    ) -> Result<Credential> {
        self.renew_at(credential, duration_secs, class, level, unix_now())
            .await
    }

    /// Renew a credential relative to `now`.
    ///
    /// The predecessor must be authentic, unexpired and unrevoked. The
    /// successor keeps the token and id and becomes canonical only once the
    /// rotation cache accepts it. Renewal is deterministic, so retrying with
    /// the same arguments and `now` after a lost response succeeds again.
    pub async fn renew_at(
        &self,
        credential: &Credential,
        duration_secs: i64,
        class: i8,
        level: Level,
        now: i64,
    ) -> Result<Credential> {
        let renewed = self
            .advance(credential, duration_secs, class, level, now)
            .await;
        self.sweep_if_due(now).await;
        renewed
    }

    async fn advance(
        &self,
        credential: &Credential,
        duration_secs: i64,
        class: i8,
        level: Level,
        now: i64,
    ) -> Result<Credential> {
        self.check(credential, now, true)
            .await
            .map_err(|e| rejected(credential, e))?;

        let renewed = credential
            .renew_at(now, &self.seed, duration_secs, class, level)
            .map_err(|e| rejected(credential, e.into()))?;

        let rotation = self
            .rotations
            .validate_and_advance_at(credential, &renewed, now)
            .await?;
        if rotation == Rotation::AlreadyCurrent {
            tracing::debug!(token = %renewed.token, "renewal already applied");
        }

        tracing::debug!(token = %renewed.token, expire_at = renewed.expire_at, "renewed");
        Ok(renewed)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Maintenance
    // ─────────────────────────────────────────────────────────────────────────

    /// Delete lapsed revocation and rotation records now.
    pub async fn purge_expired(&self) -> Result<Purged> {
        self.purge_expired_at(unix_now()).await
    }

    /// Delete every revocation and rotation record whose deadline passed
    /// before `now`.
    pub async fn purge_expired_at(&self, now: i64) -> Result<Purged> {
        let purged = Purged {
            revocations: self.revocations.purge_expired_at(now).await?,
            rotations: self.rotations.purge_expired_at(now).await?,
        };
        self.last_sweep.fetch_max(now, Ordering::Relaxed);

        tracing::debug!(
            revocations = purged.revocations,
            rotations = purged.rotations,
            "purged lapsed records"
        );
        Ok(purged)
    }

    /// Sweep both backends if `sweep_interval` has passed since the last
    /// sweep. One caller wins the slot; failures wait for the next interval.
    async fn sweep_if_due(&self, now: i64) {
        let Some(interval) = self.config.sweep_interval else {
            return;
        };
        let interval = i64::try_from(interval.as_secs()).unwrap_or(i64::MAX);
        let last = self.last_sweep.load(Ordering::Relaxed);
        if now.saturating_sub(last) < interval {
            return;
        }
        if self
            .last_sweep
            .compare_exchange(last, now, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return;
        }
        // store failures were already logged by the bounded call
        let _ = self.purge_expired_at(now).await;
    }
}

/// Log a rejection under its category and hand the error back.
///
/// Store failures were already logged at `warn` where the call failed.
fn rejected(credential: &Credential, err: AuthorityError) -> AuthorityError {
    if !err.is_transient() {
        tracing::debug!(
            category = err.category(),
            token = %credential.token,
            error = %err,
            "credential rejected"
        );
    }
    err
}
