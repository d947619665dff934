//! # Dakuaz Core
//!
//! Pure primitives for Dakuaz credentials: the fixed binary record, its hash
//! binding, Ed448 signing and verification, expiry and renewal, and level
//! bitmasks.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`Credential`] - The signed, fixed-width authorization token
//! - [`TokenId`] - 64-byte identity of one issuance lineage
//! - [`Level`] - Capability bitmask
//! - [`SigningSeed`] - 57-byte Ed448 seed used to sign and verify
//!
//! ## Wire Format
//!
//! Credentials serialize to exactly [`CREDENTIAL_SIZE`] bytes. See the
//! [`canonical`] module for offsets and the binding hash pre-image.

pub mod canonical;
pub mod credential;
pub mod crypto;
pub mod error;
pub mod format;
pub mod legacy;
pub mod level;
pub mod types;

pub use canonical::{binding_hash, CREDENTIAL_SIZE};
pub use credential::{Credential, CredentialBuilder};
pub use crypto::{Blake2bHash, Ed448Signature, SigningSeed, VerifyingKey, SEED_SIZE};
pub use error::{CoreError, Result};
pub use format::{AnyCredential, RecordFormat};
pub use legacy::{LegacyCredential, LEGACY_CREDENTIAL_SIZE};
pub use level::{compose, is_authorized, Level};
pub use types::{unix_now, TokenId, TOKEN_SIZE};
