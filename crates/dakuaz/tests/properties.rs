//! Property tests over the Authority.

use dakuaz::store::MemoryStore;
use dakuaz::cipher::seal;
use dakuaz::{Authority, AuthorityConfig, AuthorityError, Level, CREDENTIAL_SIZE};
use dakuaz_testkit::generators::{blake2b_hash, level, payload, tamper};
use dakuaz_testkit::{apply_tamper, credential_from_params, CredentialParams};
use proptest::prelude::*;

fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
        .block_on(fut)
}

fn authority(params: &CredentialParams) -> Authority<MemoryStore, MemoryStore> {
    Authority::new(
        params.seed.clone(),
        MemoryStore::new(),
        MemoryStore::new(),
        AuthorityConfig::default(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_tampered_credentials_never_verify(params: CredentialParams, target in tamper()) {
        let auth = authority(&params);
        let c = apply_tamper(&credential_from_params(&params), target);

        let result = block_on(auth.verify_at(&c, 0));
        prop_assert!(matches!(result, Err(AuthorityError::VerificationFailure)));
    }

    #[test]
    fn prop_verify_follows_expiry(params: CredentialParams, now in any::<i64>()) {
        let auth = authority(&params);
        let c = credential_from_params(&params);

        let result = block_on(auth.verify_at(&c, now));
        if now > params.expire_at {
            let expired = matches!(result, Err(AuthorityError::Expired { .. }));
            prop_assert!(expired);
        } else {
            prop_assert!(result.is_ok());
        }
    }

    #[test]
    fn prop_authorize_matches_bitmask(params: CredentialParams, required in level()) {
        let auth = authority(&params);
        let c = credential_from_params(&params);
        let now = params.expire_at;

        let result = block_on(auth.authorize_at(&c, &[required], now));
        if c.level.contains(required) {
            prop_assert!(result.is_ok());
        } else {
            match result {
                Err(AuthorityError::Unauthorized { missing }) => {
                    prop_assert_eq!(missing, Level(required.bits() & !c.level.bits()));
                }
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn prop_foreign_hash_never_verifies(params: CredentialParams, foreign in blake2b_hash()) {
        let auth = authority(&params);
        let mut c = credential_from_params(&params);
        prop_assume!(foreign != c.hash);
        c.hash = foreign;

        let result = block_on(auth.verify_at(&c, 0));
        prop_assert!(matches!(result, Err(AuthorityError::VerificationFailure)));
    }

    #[test]
    fn prop_sealed_import_rejects_wrong_width(
        params: CredentialParams,
        body in payload(2 * CREDENTIAL_SIZE),
    ) {
        prop_assume!(body.len() != CREDENTIAL_SIZE);
        let auth = authority(&params).with_transport_password("transport secret");

        match auth.import(&seal(&body, b"transport secret")) {
            Err(AuthorityError::InvalidRecordSize { expected, actual }) => {
                prop_assert_eq!(expected, CREDENTIAL_SIZE);
                prop_assert_eq!(actual, body.len());
            }
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }
}
