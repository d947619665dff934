//! The earlier record layout ("V1"): no token identity, no stored hash.
//!
//! ```text
//! offset  width  field
//!      0     32  id         BLAKE2b-256(principal)
//!     32      1  class      i8
//!     33      1  level      i8 bitmask
//!     34      8  expire_at  i64 big-endian
//!     42      1  echo       0x00 / 0x01
//!     43    114  signature  Ed448 over BLAKE2b-256(bytes[0..43])
//!    ---
//!    157
//! ```
//!
//! Records of this layout cannot enter the revocation store or the rotation
//! cache since they carry no token identity.

use crate::crypto::{Blake2bHash, Ed448Signature, SigningSeed, DIGEST_SIZE, SIGNATURE_SIZE};
use crate::error::{CoreError, Result};
use crate::types::unix_now;

/// Width of the signed prefix of a legacy record.
pub const LEGACY_SIGNED_SIZE: usize = DIGEST_SIZE + 1 + 1 + 8 + 1;

/// Total width of a legacy record.
pub const LEGACY_CREDENTIAL_SIZE: usize = LEGACY_SIGNED_SIZE + SIGNATURE_SIZE;

/// A credential in the legacy layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyCredential {
    pub id: Blake2bHash,
    pub class: i8,
    pub level: i8,
    pub expire_at: i64,
    pub echo: bool,
    pub signature: Ed448Signature,
}

impl LegacyCredential {
    /// Issue a legacy credential with an absolute expiry.
    pub fn issue_at(
        principal: &str,
        class: i8,
        level: i8,
        expire_at: i64,
        echo: bool,
        seed: &SigningSeed,
    ) -> Result<Self> {
        let mut credential = Self {
            id: Blake2bHash::digest(principal.as_bytes()),
            class,
            level,
            expire_at,
            echo,
            signature: Ed448Signature::ZERO,
        };
        credential.signature = seed.sign(credential.compute_hash().as_bytes())?;
        Ok(credential)
    }

    fn signed_prefix(&self) -> [u8; LEGACY_SIGNED_SIZE] {
        let mut buf = [0u8; LEGACY_SIGNED_SIZE];
        buf[..DIGEST_SIZE].copy_from_slice(&self.id.0);
        buf[DIGEST_SIZE] = self.class as u8;
        buf[DIGEST_SIZE + 1] = self.level as u8;
        buf[DIGEST_SIZE + 2..DIGEST_SIZE + 10].copy_from_slice(&self.expire_at.to_be_bytes());
        buf[DIGEST_SIZE + 10] = u8::from(self.echo);
        buf
    }

    /// The hash is never stored in this layout; it is always recomputed.
    pub fn compute_hash(&self) -> Blake2bHash {
        Blake2bHash::digest(&self.signed_prefix())
    }

    /// Serialize to the 157-byte record.
    pub fn to_bytes(&self) -> [u8; LEGACY_CREDENTIAL_SIZE] {
        let mut buf = [0u8; LEGACY_CREDENTIAL_SIZE];
        buf[..LEGACY_SIGNED_SIZE].copy_from_slice(&self.signed_prefix());
        buf[LEGACY_SIGNED_SIZE..].copy_from_slice(&self.signature.0);
        buf
    }

    /// Deserialize from a 157-byte record.
    ///
    /// Only an echo byte of exactly `0x01` decodes as `true`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != LEGACY_CREDENTIAL_SIZE {
            return Err(CoreError::MalformedRecord {
                expected: LEGACY_CREDENTIAL_SIZE,
                actual: bytes.len(),
            });
        }

        let mut id = [0u8; DIGEST_SIZE];
        id.copy_from_slice(&bytes[..DIGEST_SIZE]);
        let mut expire_at = [0u8; 8];
        expire_at.copy_from_slice(&bytes[DIGEST_SIZE + 2..DIGEST_SIZE + 10]);
        let mut signature = [0u8; SIGNATURE_SIZE];
        signature.copy_from_slice(&bytes[LEGACY_SIGNED_SIZE..]);

        Ok(Self {
            id: Blake2bHash(id),
            class: bytes[DIGEST_SIZE] as i8,
            level: bytes[DIGEST_SIZE + 1] as i8,
            expire_at: i64::from_be_bytes(expire_at),
            echo: bytes[DIGEST_SIZE + 10] == 1,
            signature: Ed448Signature(signature),
        })
    }

    /// Verify the signature against the recomputed hash.
    pub fn verify_signature(&self, seed: &SigningSeed) -> Result<()> {
        seed.verifying_key()
            .map_err(|_| CoreError::VerificationFailed)?
            .verify(self.compute_hash().as_bytes(), &self.signature)
    }

    pub fn verify(&self, seed: &SigningSeed) -> bool {
        self.verify_signature(seed).is_ok()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(unix_now())
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.expire_at
    }
}
