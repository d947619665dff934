//! # Dakuaz Cipher
//!
//! Opaque transport wrapping for serialized credentials.
//!
//! ## Encryption Model
//!
//! 1. **Key**: BLAKE2b-256 of a shared password
//! 2. **Nonce**: 24 random bytes, sent in clear as the blob prefix
//! 3. **Body**: the payload XORed with the XChaCha20 keystream
//!
//! This layer gives confidentiality only. It has no authentication tag: a
//! blob opened with the wrong password decrypts to garbage without an error.
//! For credentials, the Ed448 signature inside the record is what rejects
//! such garbage, and [`open_record`] adds a coarse width check.
//!
//! ## Usage
//!
//! ```rust
//! use dakuaz_cipher::{open, seal};
//!
//! let blob = seal(b"serialized credential", b"shared password");
//! let plain = open(&blob, b"shared password").unwrap();
//! assert_eq!(plain, b"serialized credential");
//! ```

pub mod crypto;
pub mod envelope;
pub mod error;

pub use crypto::{Keystream, TransportKey, TransportNonce, NONCE_SIZE};
pub use envelope::{
    open, open_record, open_stream, seal, seal_stream, seal_with_nonce, CHUNK_SIZE,
};
pub use error::{CipherError, Result};
