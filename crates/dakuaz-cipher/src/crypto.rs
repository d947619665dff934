//! Key derivation and keystream for the transport cipher.
//!
//! The key is BLAKE2b-256 of the password; the keystream is XChaCha20 under
//! that key and a 24-byte nonce, starting at block counter zero.

use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::{Key, XChaCha20, XNonce};
use rand::RngCore;

use dakuaz_core::Blake2bHash;

/// Width of an XChaCha20 nonce.
pub const NONCE_SIZE: usize = 24;

/// Width of a transport key.
pub const KEY_SIZE: usize = 32;

/// A 256-bit key derived from a transport password.
#[derive(Clone)]
pub struct TransportKey([u8; KEY_SIZE]);

impl TransportKey {
    /// Derive the key from a password.
    pub fn derive(password: &[u8]) -> Self {
        Self(Blake2bHash::digest(password).0)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Start a keystream at offset zero for the given nonce.
    pub fn keystream(&self, nonce: &TransportNonce) -> Keystream {
        Keystream(XChaCha20::new(
            Key::from_slice(&self.0),
            XNonce::from_slice(&nonce.0),
        ))
    }
}

impl std::fmt::Debug for TransportKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TransportKey(..)")
    }
}

/// A 192-bit extended nonce, written in clear as the ciphertext prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportNonce(pub [u8; NONCE_SIZE]);

impl TransportNonce {
    /// Generate a new random nonce.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut bytes = [0u8; NONCE_SIZE];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

/// A running XChaCha20 keystream.
///
/// Output depends only on key, nonce and absolute offset, so the way input is
/// split across calls does not matter.
pub struct Keystream(XChaCha20);

impl Keystream {
    /// XOR the next `buf.len()` keystream bytes into `buf`.
    pub fn apply(&mut self, buf: &mut [u8]) {
        self.0.apply_keystream(buf);
    }
}
