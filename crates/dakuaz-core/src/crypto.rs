//! Cryptographic primitives for Dakuaz credentials.
//!
//! Wraps Ed448 signing and BLAKE2b-256 hashing with strong types.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use ed448_rust::{PrivateKey, PublicKey};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

type Blake2b256 = Blake2b<U32>;

/// Width of an Ed448 seed (RFC 8032 private key).
pub const SEED_SIZE: usize = 57;

/// Width of an Ed448 signature.
pub const SIGNATURE_SIZE: usize = 114;

/// Width of a BLAKE2b-256 digest.
pub const DIGEST_SIZE: usize = 32;

/// A 32-byte BLAKE2b digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Blake2bHash(pub [u8; DIGEST_SIZE]);

impl Blake2bHash {
    /// Compute the BLAKE2b-256 digest of the given data.
    pub fn digest(data: &[u8]) -> Self {
        Self::digest_parts(&[data])
    }

    /// Compute the digest of several byte slices fed in order.
    pub fn digest_parts(parts: &[&[u8]]) -> Self {
        let mut hasher = Blake2b256::new();
        for part in parts {
            hasher.update(part);
        }
        let mut out = [0u8; DIGEST_SIZE];
        out.copy_from_slice(&hasher.finalize());
        Self(out)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The zero hash (sentinel value).
    pub const ZERO: Self = Self([0u8; DIGEST_SIZE]);
}

impl fmt::Debug for Blake2bHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blake2b({})", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Blake2bHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; DIGEST_SIZE]> for Blake2bHash {
    fn from(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Blake2bHash {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> std::result::Result<Self, Self::Error> {
        let arr: [u8; DIGEST_SIZE] = slice.try_into()?;
        Ok(Self(arr))
    }
}

/// A 114-byte Ed448 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed448Signature(pub [u8; SIGNATURE_SIZE]);

impl Ed448Signature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; SIGNATURE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The zero signature (invalid, used as placeholder).
    pub const ZERO: Self = Self([0u8; SIGNATURE_SIZE]);
}

impl fmt::Debug for Ed448Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed448Sig({}...)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Ed448Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; SIGNATURE_SIZE]> for Ed448Signature {
    fn from(bytes: [u8; SIGNATURE_SIZE]) -> Self {
        Self(bytes)
    }
}

/// The issuer's 57-byte Ed448 signing seed.
///
/// Both signing and verification are keyed by the seed: the verifying key is
/// derived from it on demand.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSeed([u8; SEED_SIZE]);

impl SigningSeed {
    /// Generate a new random seed.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut bytes = [0u8; SEED_SIZE];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw seed bytes.
    pub const fn from_bytes(bytes: [u8; SEED_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, rejecting anything that is not exactly 57 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; SEED_SIZE] = bytes.try_into().map_err(|_| {
            CoreError::Signing(format!(
                "seed must be {} bytes, got {}",
                SEED_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Get the raw seed bytes (secret key material).
    pub fn as_bytes(&self) -> &[u8; SEED_SIZE] {
        &self.0
    }

    fn private_key(&self) -> Result<PrivateKey> {
        PrivateKey::try_from(&self.0[..]).map_err(|e| CoreError::Signing(format!("{:?}", e)))
    }

    /// Derive the Ed448 verifying key.
    pub fn verifying_key(&self) -> Result<VerifyingKey> {
        let private_key = self.private_key()?;
        Ok(VerifyingKey(PublicKey::from(&private_key)))
    }

    /// Sign a message (pure Ed448, empty context).
    pub fn sign(&self, message: &[u8]) -> Result<Ed448Signature> {
        let private_key = self.private_key()?;
        let sig = private_key
            .sign(message, None)
            .map_err(|e| CoreError::Signing(format!("{:?}", e)))?;
        Ok(Ed448Signature(sig))
    }
}

impl fmt::Debug for SigningSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSeed(..)")
    }
}

impl From<[u8; SEED_SIZE]> for SigningSeed {
    fn from(bytes: [u8; SEED_SIZE]) -> Self {
        Self(bytes)
    }
}

/// An Ed448 public key derived from a [`SigningSeed`].
pub struct VerifyingKey(PublicKey);

impl VerifyingKey {
    /// Verify a signature over a message.
    pub fn verify(&self, message: &[u8], signature: &Ed448Signature) -> Result<()> {
        self.0
            .verify(message, &signature.0, None)
            .map_err(|_| CoreError::VerificationFailed)
    }
}

impl fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VerifyingKey(Ed448)")
    }
}
