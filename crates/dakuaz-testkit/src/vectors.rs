//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the binding hash, the Ed448 signature and the transport
//! ciphertext so that every implementation of the record format produces
//! identical bytes. Expected values were computed with an independent
//! BLAKE2b / Ed448 / XChaCha20 implementation.

use dakuaz_cipher::{seal_with_nonce, TransportNonce, NONCE_SIZE};
use dakuaz_core::{
    Credential, CredentialBuilder, Level, SigningSeed, TokenId, SEED_SIZE, TOKEN_SIZE,
};

/// A golden credential vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Ed448 seed.
    pub seed: [u8; SEED_SIZE],
    /// Token identity.
    pub token: [u8; TOKEN_SIZE],
    /// Principal identifier.
    pub principal: &'static str,
    /// Class.
    pub class: i8,
    /// Level bitmask.
    pub level: u32,
    /// Expiry (Unix seconds).
    pub expire_at: i64,
    /// Expected principal digest (hex).
    pub expected_id: &'static str,
    /// Expected binding hash (hex).
    pub expected_hash: &'static str,
    /// Expected signature (hex).
    pub expected_signature: &'static str,
}

/// Get all golden credential vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "alice_basic",
            seed: [0x01; SEED_SIZE],
            token: [0x11; TOKEN_SIZE],
            principal: "alice",
            class: 1,
            level: 0b011,
            expire_at: 1_700_003_600,
            expected_id: "e11d814979372c883b50bdb0ffadb1eaf0898bf54fd4fbf298af126fbabbda4c",
            expected_hash: "99edb0311c79a5cfe311f13fd937a792cf0d10ba31b3e15f23808674ba615767",
            expected_signature: "669a0c993e5b33360a49795a1ce46001c4fec51d8c6c6e2fb4150db0220748f0\
                                 3dcc392ef6d738fa173ee9897af4e8968cc425e8f3537c8800bb1f595f791ec1\
                                 216a8b306f2a66cb810ac357c81b8aea13861a766b4d7b193999a7defdff0e3d\
                                 ad5314e003760dda1dfdc01339f8b9012300",
        },
        GoldenVector {
            name: "negative_class_full_level",
            seed: [0x02; SEED_SIZE],
            token: [0xa5; TOKEN_SIZE],
            principal: "bob@example.com",
            class: -7,
            level: u32::MAX,
            expire_at: 4_102_444_800,
            expected_id: "a66617f1d9cc19442acfd0c6083edb2ebef990dfe41fced36ff90ec13cfc49be",
            expected_hash: "a61a7db32e8a9f3cacddb0c89dda45883c88f6ddc70f82e5549d2e4478b35dfe",
            expected_signature: "914470d3c22ead18aae576f034371adbb4b2509eae3e67f49916ae4f6d1fae97\
                                 af040f40456bb543422451560acc6bdb14088c0ce0528aa10085c51c3ae17278\
                                 af029ec2687221b099b9fb1504e5055eec3a624bd38d2cf0b412eaf1fa8e1ba7\
                                 eb5a13a761bbc3aae0d5dc20ba7407c11b00",
        },
        GoldenVector {
            name: "expired_empty_principal",
            seed: [0x03; SEED_SIZE],
            token: counting_token(),
            principal: "",
            class: 0,
            level: 0,
            expire_at: -1,
            expected_id: "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8",
            expected_hash: "870d155449e247e0a7ea9774ccf8e373a0d37cc9779ee24778013257546a9571",
            expected_signature: "7cfe0510e83e4fca6b2039cf20a337ebc7a284faadaf4534839189e171559a4a\
                                 d2882edfd756dcecb097c05922cd05261e28579a2f1c0ff780d8b72168f60566\
                                 b6dcf5c4c9d7a84012f806be80830a7439efa08fd82b654e0e89ae51ea161754\
                                 23de06892adc87617fb67770ad69dcaf0b00",
        },
    ]
}

fn counting_token() -> [u8; TOKEN_SIZE] {
    core::array::from_fn(|i| i as u8)
}

/// Build the credential described by a golden vector.
pub fn credential_from_vector(vector: &GoldenVector) -> Credential {
    CredentialBuilder::new(vector.principal)
        .token(TokenId::from_bytes(vector.token))
        .class(vector.class)
        .level(Level(vector.level))
        .expire_at(vector.expire_at)
        .sign(&SigningSeed::from_bytes(vector.seed))
        .expect("vector seeds are well-formed")
}

/// Verify all golden vectors.
///
/// Returns `(name, matches, hash_hex)` for each vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let c = credential_from_vector(v);
            let hash = c.hash.to_hex();
            let matches = c.id.to_hex() == v.expected_id
                && hash == v.expected_hash
                && c.signature.to_hex() == v.expected_signature;
            (v.name.to_string(), matches, hash)
        })
        .collect()
}

/// A golden transport vector.
#[derive(Debug, Clone)]
pub struct TransportVector {
    pub password: &'static [u8],
    pub nonce: [u8; NONCE_SIZE],
    pub plaintext: &'static [u8],
    /// Expected `nonce || ciphertext` (hex).
    pub expected_sealed: &'static str,
}

/// The golden transport vector.
pub fn transport_vector() -> TransportVector {
    TransportVector {
        password: b"dakuaz-transport",
        nonce: core::array::from_fn(|i| i as u8),
        plaintext: b"the quick brown fox jumps over the lazy dog; the lazy dog stays asleep",
        expected_sealed: "000102030405060708090a0b0c0d0e0f1011121314151617\
                          9f89f6011fd0a991538572a6ce8ecc9583c546e980bdb9d0d918f043c3428804\
                          b9207f0ee6a2c8bf34d55712bca3768035b1ca8479e75c15497990580ff2a3b9\
                          41c2783b5025",
    }
}

/// Seal the transport vector's plaintext with its fixed nonce.
pub fn seal_transport_vector(vector: &TransportVector) -> Vec<u8> {
    seal_with_nonce(
        vector.plaintext,
        vector.password,
        &TransportNonce::from_bytes(vector.nonce),
    )
}
