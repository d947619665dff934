//! Proptest generators for property-based testing.

use proptest::prelude::*;

use dakuaz_core::{
    Blake2bHash, Credential, CredentialBuilder, Level, SigningSeed, TokenId, SEED_SIZE,
    TOKEN_SIZE,
};

/// Generate a random signing seed.
pub fn seed() -> impl Strategy<Value = SigningSeed> {
    prop::collection::vec(any::<u8>(), SEED_SIZE).prop_map(|bytes| {
        let mut seed = [0u8; SEED_SIZE];
        seed.copy_from_slice(&bytes);
        SigningSeed::from_bytes(seed)
    })
}

/// Generate a random token identity.
pub fn token_id() -> impl Strategy<Value = TokenId> {
    prop::collection::vec(any::<u8>(), TOKEN_SIZE).prop_map(|bytes| {
        let mut token = [0u8; TOKEN_SIZE];
        token.copy_from_slice(&bytes);
        TokenId::from_bytes(token)
    })
}

/// Generate a random digest.
pub fn blake2b_hash() -> impl Strategy<Value = Blake2bHash> {
    any::<[u8; 32]>().prop_map(Blake2bHash::from_bytes)
}

/// Generate a level bitmask.
pub fn level() -> impl Strategy<Value = Level> {
    any::<u32>().prop_map(Level)
}

/// Generate an expiry instant, including the distant past and future.
pub fn expire_at() -> impl Strategy<Value = i64> {
    prop_oneof![
        -1_000_000i64..=0i64,
        0i64..=4_102_444_800i64,
        Just(i64::MIN),
        Just(i64::MAX),
    ]
}

/// Generate a principal identifier.
pub fn principal() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9@._-]{0,48}".prop_map(String::from)
}

/// Generate transport payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Parameters for generating a credential.
#[derive(Debug, Clone)]
pub struct CredentialParams {
    pub seed: SigningSeed,
    pub token: TokenId,
    pub principal: String,
    pub class: i8,
    pub level: Level,
    pub expire_at: i64,
}

impl Arbitrary for CredentialParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            seed(),
            token_id(),
            principal(),
            any::<i8>(),
            level(),
            expire_at(),
        )
            .prop_map(
                |(seed, token, principal, class, level, expire_at)| CredentialParams {
                    seed,
                    token,
                    principal,
                    class,
                    level,
                    expire_at,
                },
            )
            .boxed()
    }
}

/// Generate a signed credential from parameters.
pub fn credential_from_params(params: &CredentialParams) -> Credential {
    CredentialBuilder::new(&params.principal)
        .token(params.token)
        .class(params.class)
        .level(params.level)
        .expire_at(params.expire_at)
        .sign(&params.seed)
        .expect("generated seeds are well-formed")
}

/// Which field of a credential to tamper with.
#[derive(Debug, Clone, Copy)]
pub enum Tamper {
    Token,
    Id,
    Class,
    Level,
    ExpireAt,
    Hash,
    Signature,
}

/// Generate a tampering target.
pub fn tamper() -> impl Strategy<Value = Tamper> {
    prop_oneof![
        Just(Tamper::Token),
        Just(Tamper::Id),
        Just(Tamper::Class),
        Just(Tamper::Level),
        Just(Tamper::ExpireAt),
        Just(Tamper::Hash),
        Just(Tamper::Signature),
    ]
}

/// Flip one bit of the chosen field without re-signing.
pub fn apply_tamper(credential: &Credential, target: Tamper) -> Credential {
    let mut c = *credential;
    match target {
        Tamper::Token => c.token.0[0] ^= 1,
        Tamper::Id => c.id.0[0] ^= 1,
        Tamper::Class => c.class ^= 1,
        Tamper::Level => c.level = Level(c.level.0 ^ 1),
        Tamper::ExpireAt => c.expire_at ^= 1,
        Tamper::Hash => c.hash.0[0] ^= 1,
        Tamper::Signature => c.signature.0[0] ^= 1,
    }
    c
}
