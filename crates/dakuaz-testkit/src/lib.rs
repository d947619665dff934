//! # Dakuaz Testkit
//!
//! Testing utilities for Dakuaz.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Fixed inputs with expected hash, signature and
//!   ciphertext bytes for cross-implementation verification
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: An authority over in-memory stores with a fixed clock
//!
//! ## Golden Vectors
//!
//! ```rust
//! use dakuaz_testkit::vectors::{all_vectors, credential_from_vector};
//!
//! for vector in all_vectors() {
//!     let credential = credential_from_vector(&vector);
//!     assert_eq!(credential.hash.to_hex(), vector.expected_hash);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use dakuaz_testkit::generators::{credential_from_params, CredentialParams};
//!
//! proptest! {
//!     #[test]
//!     fn issued_credentials_verify(params: CredentialParams) {
//!         let c = credential_from_params(&params);
//!         prop_assert!(c.verify(&params.seed));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use dakuaz_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let credential = fixture.issue("alice", 0b011, 3600);
//! assert!(credential.verify(&fixture.seed));
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{independent_issuers, TestFixture, FIXTURE_NOW};
pub use generators::{apply_tamper, credential_from_params, CredentialParams, Tamper};
pub use vectors::{
    all_vectors, credential_from_vector, transport_vector, verify_all_vectors, GoldenVector,
    TransportVector,
};
