//! Credential: the signed, fixed-width authorization token.
//!
//! A credential binds a token identity, a principal digest, a class, a level
//! bitmask and an expiry instant under a binding hash, and carries an Ed448
//! signature over that hash. Values handed out are never modified: renewal
//! derives a new credential.

use crate::canonical::{binding_hash, decode_record, encode_record, CREDENTIAL_SIZE};
use crate::crypto::{Blake2bHash, Ed448Signature, SigningSeed};
use crate::error::{CoreError, Result};
use crate::level::Level;
use crate::types::{unix_now, TokenId};

/// A complete credential record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credential {
    /// Per-issuance identity handle, preserved across renewals.
    pub token: TokenId,

    /// Digest of the principal identifier.
    pub id: Blake2bHash,

    /// Coarse category.
    pub class: i8,

    /// Granted capabilities.
    pub level: Level,

    /// Unix seconds after which the credential is invalid.
    pub expire_at: i64,

    /// Binding digest over token, id, class, level and expire_at.
    pub hash: Blake2bHash,

    /// Ed448 signature over `hash`.
    pub signature: Ed448Signature,
}

impl Credential {
    /// Issue a credential for a principal, valid for `duration_secs` from now.
    ///
    /// A fresh random token identity is generated.
    pub fn issue(
        principal: &str,
        class: i8,
        level: Level,
        duration_secs: i64,
        seed: &SigningSeed,
    ) -> Result<Self> {
        CredentialBuilder::new(principal)
            .class(class)
            .level(level)
            .expires_in(duration_secs)
            .sign(seed)
    }

    /// Recompute the binding digest from the current field values.
    pub fn compute_hash(&self) -> Blake2bHash {
        binding_hash(&self.token, &self.id, self.class, self.level, self.expire_at)
    }

    /// Serialize to the fixed-width wire record.
    pub fn to_bytes(&self) -> [u8; CREDENTIAL_SIZE] {
        encode_record(self)
    }

    /// Deserialize from the wire record.
    ///
    /// Fails with [`CoreError::MalformedRecord`] unless `bytes` is exactly
    /// [`CREDENTIAL_SIZE`] long. No cryptographic check is performed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode_record(bytes)
    }

    /// Check the binding hash, then the signature.
    ///
    /// A stored hash that differs from the recomputed one is rejected before
    /// any signature work is done. Both failures report
    /// [`CoreError::VerificationFailed`].
    pub fn verify_signature(&self, seed: &SigningSeed) -> Result<()> {
        let recomputed = self.compute_hash();
        if recomputed != self.hash {
            return Err(CoreError::VerificationFailed);
        }
        seed.verifying_key()
            .map_err(|_| CoreError::VerificationFailed)?
            .verify(recomputed.as_bytes(), &self.signature)
    }

    /// Boolean form of [`Credential::verify_signature`].
    pub fn verify(&self, seed: &SigningSeed) -> bool {
        self.verify_signature(seed).is_ok()
    }

    /// True once wall-clock time is past `expire_at`. No grace period.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(unix_now())
    }

    /// True when `now` is past `expire_at`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.expire_at
    }

    /// Liveness check as a `Result`, independent of signature validity.
    pub fn check_expiry_at(&self, now: i64) -> Result<()> {
        if self.is_expired_at(now) {
            return Err(CoreError::Expired {
                expire_at: self.expire_at,
            });
        }
        Ok(())
    }

    /// Seconds until expiry at `now`, or zero if already expired.
    pub fn remaining_secs_at(&self, now: i64) -> i64 {
        self.expire_at.saturating_sub(now).max(0)
    }

    /// Derive a renewed credential valid for `duration_secs` from now.
    pub fn renew(
        &self,
        seed: &SigningSeed,
        duration_secs: i64,
        class: i8,
        level: Level,
    ) -> Result<Self> {
        self.renew_at(unix_now(), seed, duration_secs, class, level)
    }

    /// Derive a renewed credential relative to `now`.
    ///
    /// Token and id are kept; class and level are replaced; the expiry must
    /// strictly increase. The result is re-hashed and re-signed.
    pub fn renew_at(
        &self,
        now: i64,
        seed: &SigningSeed,
        duration_secs: i64,
        class: i8,
        level: Level,
    ) -> Result<Self> {
        let proposed = now.saturating_add(duration_secs);
        if proposed <= self.expire_at {
            return Err(CoreError::ExpiryNotExtended {
                current: self.expire_at,
                proposed,
            });
        }

        CredentialBuilder::from_id(self.id)
            .token(self.token)
            .class(class)
            .level(level)
            .expire_at(proposed)
            .sign(seed)
    }
}

/// Expiry specification for a builder.
#[derive(Debug, Clone, Copy)]
enum Expiry {
    At(i64),
    In(i64),
}

/// Builder for issuing credentials.
#[derive(Debug, Clone)]
pub struct CredentialBuilder {
    id: Blake2bHash,
    token: Option<TokenId>,
    class: i8,
    level: Level,
    expiry: Expiry,
}

impl CredentialBuilder {
    /// Start a credential for a principal identifier.
    pub fn new(principal: &str) -> Self {
        Self::from_id(Blake2bHash::digest(principal.as_bytes()))
    }

    /// Start a credential for an already-hashed principal.
    pub fn from_id(id: Blake2bHash) -> Self {
        Self {
            id,
            token: None,
            class: 0,
            level: Level::NONE,
            expiry: Expiry::In(0),
        }
    }

    /// Use a fixed token identity instead of a random one.
    pub fn token(mut self, token: TokenId) -> Self {
        self.token = Some(token);
        self
    }

    /// Set the class.
    pub fn class(mut self, class: i8) -> Self {
        self.class = class;
        self
    }

    /// Set the level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Expire at an absolute Unix second.
    pub fn expire_at(mut self, expire_at: i64) -> Self {
        self.expiry = Expiry::At(expire_at);
        self
    }

    /// Expire `duration_secs` after signing. May be negative.
    pub fn expires_in(mut self, duration_secs: i64) -> Self {
        self.expiry = Expiry::In(duration_secs);
        self
    }

    /// Hash the bound fields and sign.
    pub fn sign(self, seed: &SigningSeed) -> Result<Credential> {
        let expire_at = match self.expiry {
            Expiry::At(at) => at,
            Expiry::In(secs) => unix_now().saturating_add(secs),
        };
        let token = self.token.unwrap_or_else(TokenId::generate);
        let hash = binding_hash(&token, &self.id, self.class, self.level, expire_at);
        let signature = seed.sign(hash.as_bytes())?;

        Ok(Credential {
            token,
            id: self.id,
            class: self.class,
            level: self.level,
            expire_at,
            hash,
            signature,
        })
    }
}
