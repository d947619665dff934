//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use dakuaz::{Authority, AuthorityConfig};
use dakuaz_core::{Credential, CredentialBuilder, Level, SigningSeed, TokenId, SEED_SIZE};
use dakuaz_store::MemoryStore;

/// Fixed clock used by fixtures so tests never depend on wall time.
pub const FIXTURE_NOW: i64 = 1_700_000_000;

/// A test fixture with a seed and an authority over in-memory stores.
pub struct TestFixture {
    pub seed: SigningSeed,
    pub authority: Authority<MemoryStore, MemoryStore>,
}

impl TestFixture {
    /// Create a new test fixture with a random seed.
    pub fn new() -> Self {
        Self::from_seed(SigningSeed::generate(), AuthorityConfig::default())
    }

    /// Create with a deterministic seed.
    pub fn with_seed(seed: [u8; SEED_SIZE]) -> Self {
        Self::from_seed(SigningSeed::from_bytes(seed), AuthorityConfig::default())
    }

    /// Create with a deterministic seed and explicit configuration.
    pub fn with_config(seed: [u8; SEED_SIZE], config: AuthorityConfig) -> Self {
        Self::from_seed(SigningSeed::from_bytes(seed), config)
    }

    fn from_seed(seed: SigningSeed, config: AuthorityConfig) -> Self {
        let authority = Authority::new(seed.clone(), MemoryStore::new(), MemoryStore::new(), config);
        Self { seed, authority }
    }

    /// Seal exports from this fixture's authority under `password`.
    pub fn sealed(self, password: &str) -> Self {
        Self {
            seed: self.seed,
            authority: self.authority.with_transport_password(password),
        }
    }

    /// Issue a credential valid for `duration_secs` from [`FIXTURE_NOW`].
    pub fn issue(&self, principal: &str, level: u32, duration_secs: i64) -> Credential {
        self.authority
            .issue_at(principal, 1, Level(level), duration_secs, FIXTURE_NOW)
            .expect("fixture seed signs")
    }

    /// Issue a credential with a fixed token, for deterministic output.
    pub fn issue_fixed(&self, principal: &str, token: [u8; 64], expire_at: i64) -> Credential {
        CredentialBuilder::new(principal)
            .token(TokenId::from_bytes(token))
            .class(1)
            .level(Level(0b011))
            .expire_at(expire_at)
            .sign(&self.seed)
            .expect("fixture seed signs")
    }

    /// The revocation backend, for availability and latency hooks.
    pub fn revocation_backend(&self) -> &MemoryStore {
        self.authority.revocations().store()
    }

    /// The rotation backend, for availability and latency hooks.
    pub fn rotation_backend(&self) -> &MemoryStore {
        self.authority.rotations().store()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create fixtures for independent issuers with distinct deterministic seeds.
pub fn independent_issuers(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; SEED_SIZE];
            seed[0] = i as u8;
            TestFixture::with_seed(seed)
        })
        .collect()
}
