//! End-to-end credential lifecycle: issue, transport, verify, renew with
//! rotation, revoke, and backend failure handling.

use std::sync::Arc;
use std::time::Duration;

use dakuaz::store::{MemoryStore, SqliteStore};
use dakuaz::{
    compose, is_authorized, Authority, AuthorityConfig, AuthorityError, Level, SigningSeed,
};
use dakuaz_testkit::{TestFixture, FIXTURE_NOW};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[tokio::test]
async fn test_issue_verify_authorize_scenario() -> anyhow::Result<()> {
    init_tracing();
    let fixture = TestFixture::with_seed([0x42; 57]);
    let auth = &fixture.authority;

    let c = auth.issue_at("alice", 1, Level(0b011), 3600, FIXTURE_NOW)?;

    assert!(c.verify(&fixture.seed));
    assert!(!c.is_expired_at(FIXTURE_NOW));
    assert!(is_authorized(&c, &[Level(0b001)]));
    assert!(!is_authorized(&c, &[Level(0b100)]));

    auth.authorize_at(&c, &[Level(0b001)], FIXTURE_NOW).await?;
    let err = auth
        .authorize_at(&c, &[Level(0b100)], FIXTURE_NOW)
        .await
        .unwrap_err();
    assert_eq!(err.category(), "unauthorized");

    let both = compose(&[Level(0b001), Level(0b010)]);
    auth.authorize_at(&c, &[both], FIXTURE_NOW).await?;
    Ok(())
}

#[tokio::test]
async fn test_sealed_transport_roundtrip() -> anyhow::Result<()> {
    let fixture = TestFixture::with_seed([0x42; 57]).sealed("transport secret");
    let auth = &fixture.authority;

    let c = auth.issue_at("alice", 1, Level(0b011), 3600, FIXTURE_NOW)?;
    let blob = auth.export(&c);
    assert_ne!(&blob[24..], &c.to_bytes()[..]);

    let presented = auth.import(&blob)?;
    assert_eq!(presented, c);
    auth.verify_at(&presented, FIXTURE_NOW).await?;
    Ok(())
}

#[tokio::test]
async fn test_rotation_rejects_stale_predecessor() -> anyhow::Result<()> {
    let fixture = TestFixture::with_seed([0x42; 57]);
    let auth = &fixture.authority;

    let c1 = auth.issue_at("alice", 1, Level(0b001), 600, FIXTURE_NOW)?;
    let c2 = auth
        .renew_at(&c1, 3600, 1, Level(0b011), FIXTURE_NOW + 10)
        .await?;

    // replaying the rotated-away credential cannot mint another successor
    let replay = auth
        .renew_at(&c1, 7200, 1, Level(0b111), FIXTURE_NOW + 20)
        .await;
    assert!(matches!(replay, Err(AuthorityError::Mismatch)));

    let c3 = auth
        .renew_at(&c2, 7200, 1, Level(0b111), FIXTURE_NOW + 20)
        .await?;
    assert_eq!(c3.token, c1.token);
    assert_eq!(
        auth.rotations()
            .current_hash_at(&c1.token, FIXTURE_NOW + 20)
            .await?,
        Some(c3.hash)
    );
    Ok(())
}

#[tokio::test]
async fn test_renewal_retry_is_idempotent() -> anyhow::Result<()> {
    let fixture = TestFixture::with_seed([0x42; 57]);
    let auth = &fixture.authority;

    let c1 = auth.issue_at("alice", 1, Level(0b001), 600, FIXTURE_NOW)?;
    let first = auth
        .renew_at(&c1, 3600, 1, Level(0b001), FIXTURE_NOW + 5)
        .await?;
    let retried = auth
        .renew_at(&c1, 3600, 1, Level(0b001), FIXTURE_NOW + 5)
        .await?;

    assert_eq!(first, retried);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_renewals_single_winner() -> anyhow::Result<()> {
    let fixture = TestFixture::with_seed([0x42; 57]);
    let c1 = fixture
        .authority
        .issue_at("alice", 1, Level(0b001), 600, FIXTURE_NOW)?;
    let auth = Arc::new(fixture.authority);

    let mut handles = Vec::new();
    for i in 0..8i64 {
        let auth = Arc::clone(&auth);
        handles.push(tokio::spawn(async move {
            auth.renew_at(&c1, 3600 + i, 1, Level(0b001), FIXTURE_NOW + 1)
                .await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => winners += 1,
            Err(e) => assert!(matches!(e, AuthorityError::Mismatch)),
        }
    }
    assert_eq!(winners, 1);
    Ok(())
}

#[tokio::test]
async fn test_revocation_lifecycle() -> anyhow::Result<()> {
    let fixture = TestFixture::with_seed([0x42; 57]);
    let auth = &fixture.authority;

    let c = auth.issue_at("alice", 1, Level(0b011), 3600, FIXTURE_NOW)?;
    auth.revoke(&c).await?;

    assert!(auth.revocations().is_revoked_at(&c.token, FIXTURE_NOW).await?);
    assert!(matches!(
        auth.verify_at(&c, FIXTURE_NOW).await,
        Err(AuthorityError::Revoked)
    ));
    assert!(matches!(
        auth.renew_at(&c, 7200, 1, Level(0b011), FIXTURE_NOW).await,
        Err(AuthorityError::Revoked)
    ));

    // the record self-expires with the credential
    let after = c.expire_at + 1;
    assert!(!auth.revocations().is_revoked_at(&c.token, after).await?);
    assert!(matches!(
        auth.verify_at(&c, after).await,
        Err(AuthorityError::Expired { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_expired_credential_reports_expired() -> anyhow::Result<()> {
    let fixture = TestFixture::with_seed([0x42; 57]);
    let c = fixture.issue("alice", 0b001, -1);

    assert!(c.verify(&fixture.seed));
    assert!(c.is_expired_at(FIXTURE_NOW));
    assert!(matches!(
        fixture.authority.verify_at(&c, FIXTURE_NOW).await,
        Err(AuthorityError::Expired { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_unavailable_store_is_not_absence() -> anyhow::Result<()> {
    init_tracing();
    let fixture = TestFixture::with_seed([0x42; 57]);
    let c = fixture.issue("alice", 0b001, 3600);

    fixture.revocation_backend().set_available(false);
    let err = fixture
        .authority
        .verify_at(&c, FIXTURE_NOW)
        .await
        .unwrap_err();
    assert!(err.is_transient());
    assert_eq!(err.category(), "store_unavailable");

    fixture.revocation_backend().set_available(true);
    fixture.rotation_backend().set_available(false);
    let err = fixture
        .authority
        .renew_at(&c, 7200, 1, Level(0b001), FIXTURE_NOW)
        .await
        .unwrap_err();
    assert!(err.is_transient());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_slow_store_times_out() -> anyhow::Result<()> {
    let config = AuthorityConfig {
        store_timeout: Duration::from_millis(50),
        ..AuthorityConfig::default()
    };
    let fixture = TestFixture::with_config([0x42; 57], config);
    let c = fixture.issue("alice", 0b001, 3600);

    fixture.revocation_backend().set_latency(Duration::from_secs(1));
    let err = fixture
        .authority
        .verify_at(&c, FIXTURE_NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthorityError::StoreUnavailable(_)));
    Ok(())
}

#[tokio::test]
async fn test_sqlite_backends_persist() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let revocations = dir.path().join("revocations.db");
    let rotations = dir.path().join("rotations.db");
    let seed = [0x42; 57];

    let c = {
        let auth = Authority::new(
            SigningSeed::from_bytes(seed),
            SqliteStore::open(&revocations)?,
            SqliteStore::open(&rotations)?,
            AuthorityConfig::default(),
        );
        let c = auth.issue_at("alice", 1, Level(0b011), 3600, FIXTURE_NOW)?;
        let r = auth
            .renew_at(&c, 7200, 1, Level(0b011), FIXTURE_NOW + 1)
            .await?;
        auth.revoke(&r).await?;
        c
    };

    let auth = Authority::new(
        SigningSeed::from_bytes(seed),
        SqliteStore::open(&revocations)?,
        SqliteStore::open(&rotations)?,
        AuthorityConfig::default(),
    );
    assert!(auth.revocations().is_revoked_at(&c.token, FIXTURE_NOW + 2).await?);
    assert!(matches!(
        auth.renew_at(&c, 9000, 1, Level(0b011), FIXTURE_NOW + 2).await,
        Err(AuthorityError::Revoked)
    ));
    Ok(())
}

#[tokio::test]
async fn test_separate_backends_are_independent() -> anyhow::Result<()> {
    let auth = Authority::new(
        SigningSeed::from_bytes([0x42; 57]),
        MemoryStore::new(),
        MemoryStore::new(),
        AuthorityConfig::default(),
    );
    let c = auth.issue_at("alice", 1, Level(0b001), 600, FIXTURE_NOW)?;
    auth.renew_at(&c, 3600, 1, Level(0b001), FIXTURE_NOW)
        .await?;

    assert!(auth.revocations().store().is_empty());
    assert_eq!(auth.rotations().store().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_lapsed_records_are_reclaimed() -> anyhow::Result<()> {
    let fixture = TestFixture::with_seed([0x42; 57]);
    let auth = &fixture.authority;

    for i in 0..100 {
        let revoked = fixture.issue(&format!("revoked-{}", i), 0b001, 10);
        auth.revoke(&revoked).await?;

        let rotated = fixture.issue(&format!("rotated-{}", i), 0b001, 5);
        auth.renew_at(&rotated, 10, 1, Level(0b001), FIXTURE_NOW)
            .await?;
    }
    assert_eq!(fixture.revocation_backend().len(), 100);
    assert_eq!(fixture.rotation_backend().len(), 100);

    let later = FIXTURE_NOW + 9_000_000;
    let fresh = auth.issue_at("alice", 1, Level(0b001), 60, later)?;
    auth.verify_at(&fresh, later).await?;

    assert!(fixture.revocation_backend().is_empty());
    assert!(fixture.rotation_backend().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_purge_reports_reclaimed_records() -> anyhow::Result<()> {
    let config = AuthorityConfig {
        sweep_interval: None,
        ..AuthorityConfig::default()
    };
    let fixture = TestFixture::with_config([0x42; 57], config);
    let auth = &fixture.authority;

    let revoked = fixture.issue("alice", 0b001, 10);
    auth.revoke(&revoked).await?;
    let kept = fixture.issue("bob", 0b001, 7200);
    auth.revoke(&kept).await?;

    let purged = auth.purge_expired_at(FIXTURE_NOW + 3600).await?;
    assert_eq!(purged.revocations, 1);
    assert_eq!(purged.rotations, 0);
    assert!(auth.revocations().is_revoked_at(&kept.token, FIXTURE_NOW + 3600).await?);
    Ok(())
}
