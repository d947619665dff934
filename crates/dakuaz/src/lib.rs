//! # Dakuaz
//!
//! A credential engine for distributed services that cannot share a
//! session store: compact, fixed-width, Ed448-signed credentials with
//! expiry, renewal, revocation and replay-safe rotation.
//!
//! ## Overview
//!
//! - **Credentials**: 255-byte records binding a token identity, principal
//!   digest, class, level bitmask and expiry under a signed hash
//! - **Transport**: optional XChaCha20 sealing for opaque hand-off
//! - **Revocation**: early invalidation that self-expires with the credential
//! - **Rotation**: compare-and-swap renewal that rejects stale predecessors
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dakuaz::{Authority, AuthorityConfig, Level, SigningSeed};
//! use dakuaz::store::MemoryStore;
//!
//! async fn example() {
//!     let seed = SigningSeed::generate();
//!     let authority = Authority::new(
//!         seed,
//!         MemoryStore::new(),
//!         MemoryStore::new(),
//!         AuthorityConfig::default(),
//!     )
//!     .with_transport_password("shared secret");
//!
//!     let credential = authority.issue("alice", 1, Level(0b011), 3600).unwrap();
//!     let blob = authority.export(&credential);
//!
//!     let presented = authority.import(&blob).unwrap();
//!     authority.authorize(&presented, &[Level(0b001)]).await.unwrap();
//!
//!     let renewed = authority
//!         .renew(&presented, 7200, 1, Level(0b011))
//!         .await
//!         .unwrap();
//!     authority.revoke(&renewed).await.unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `dakuaz::core` - Credential record, hashing, signatures, levels
//! - `dakuaz::cipher` - Transport sealing
//! - `dakuaz::store` - Key-value backends

pub mod authority;
pub mod backend;
pub mod config;
pub mod encoding;
pub mod error;
pub mod revocation;
pub mod rotation;

// Re-export component crates
pub use dakuaz_cipher as cipher;
pub use dakuaz_core as core;
pub use dakuaz_store as store;

// Re-export main types for convenience
pub use authority::{Authority, Purged};
pub use backend::DEFAULT_STORE_TIMEOUT;
pub use config::AuthorityConfig;
pub use error::{AuthorityError, Result};
pub use revocation::RevocationStore;
pub use rotation::{Rotation, RotationCache};

// Re-export commonly used core types
pub use dakuaz_core::{
    compose, is_authorized, Blake2bHash, Credential, CredentialBuilder, Ed448Signature, Level,
    SigningSeed, TokenId, CREDENTIAL_SIZE,
};
