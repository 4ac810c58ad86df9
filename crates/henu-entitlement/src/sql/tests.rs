//! Tests for the SQL store against SQLite, in memory unless a test needs
//! several connections.

use std::sync::Arc;

use crate::clock::ManualClock;
use crate::record::{AccountRecord, ClientContext, DownloadEvent, Profile, Tier};
use crate::sql::{DatabaseType, SqlStore, SqlStoreConfig};
use crate::store::{AccountStore, Append, DownloadLedger};
use crate::{DenyReason, EntitlementEngine, EntitlementError, QuotaPolicy, RecordResult, Verdict};

// 2026-10-16T00:00:00Z
const MIDNIGHT: i64 = 1_792_108_800;

async fn setup_test_db() -> SqlStore {
    let config = SqlStoreConfig::new("sqlite::memory:")
        .max_connections(1)
        .init_schema(true);
    SqlStore::connect(config)
        .await
        .expect("Failed to connect to SQLite")
}

fn account(user_id: &str, verified: bool) -> AccountRecord {
    let profile = Profile {
        email: format!("{user_id}@example.org"),
        email_verified: verified,
        display_name: Some(user_id.to_uppercase()),
        photo_url: None,
    };
    AccountRecord::new(user_id, &profile, MIDNIGHT - 1000)
}

fn event(user_id: &str, at: i64) -> DownloadEvent {
    DownloadEvent::new(
        user_id,
        at,
        ClientContext {
            user_agent: Some("curl/8".into()),
            origin: Some("https://henu-os.org".into()),
        },
    )
}

#[tokio::test]
async fn test_connect_detects_sqlite() {
    let store = setup_test_db().await;
    assert_eq!(store.database_type(), DatabaseType::SQLite);
    // Idempotent.
    store.init_schema().await.unwrap();
}

#[tokio::test]
async fn test_unsupported_url_scheme() {
    let err = SqlStore::connect(SqlStoreConfig::new("redis://localhost"))
        .await
        .unwrap_err();
    assert!(matches!(err, EntitlementError::Backend(_)));
}

#[tokio::test]
async fn test_account_roundtrip() {
    let store = setup_test_db().await;
    assert!(store.get("u1").await.unwrap().is_none());

    let record = account("u1", true).with_tier(Tier::Elevated);
    store.put(&record).await.unwrap();
    assert_eq!(store.get("u1").await.unwrap(), Some(record.clone()));

    // Upsert replaces.
    let mut changed = record.clone();
    changed.tier = Tier::Standard;
    changed.lifetime_download_count = 7;
    changed.last_download_at = Some(MIDNIGHT);
    store.put(&changed).await.unwrap();
    assert_eq!(store.get("u1").await.unwrap(), Some(changed));
}

#[tokio::test]
async fn test_insert_if_absent_keeps_existing() {
    let store = setup_test_db().await;
    assert!(store.insert_if_absent(&account("u1", false)).await.unwrap());

    let elevated = account("u1", true).with_tier(Tier::Elevated);
    assert!(!store.insert_if_absent(&elevated).await.unwrap());

    let stored = store.get("u1").await.unwrap().unwrap();
    assert_eq!(stored.tier, Tier::Standard);
    assert!(!stored.email_verified);
}

#[tokio::test]
async fn test_refresh_profile() {
    let store = setup_test_db().await;
    store
        .put(&account("u1", false).with_tier(Tier::Elevated))
        .await
        .unwrap();

    let profile = Profile {
        email: "new@example.org".into(),
        email_verified: true,
        display_name: None,
        photo_url: Some("https://cdn.example.org/u1.png".into()),
    };
    store.refresh_profile("u1", &profile, MIDNIGHT).await.unwrap();

    let stored = store.get("u1").await.unwrap().unwrap();
    assert_eq!(stored.email, "new@example.org");
    assert!(stored.email_verified);
    assert_eq!(stored.display_name, None);
    assert_eq!(stored.photo_url.as_deref(), Some("https://cdn.example.org/u1.png"));
    assert_eq!(stored.tier, Tier::Elevated);
    assert_eq!(stored.updated_at, MIDNIGHT);

    let missing = store.refresh_profile("ghost", &profile, MIDNIGHT).await;
    assert!(matches!(missing, Err(EntitlementError::NotFound)));
}

#[tokio::test]
async fn test_increment_downloads() {
    let store = setup_test_db().await;
    store.put(&account("u1", true)).await.unwrap();

    store.increment_downloads("u1", MIDNIGHT + 1).await.unwrap();
    store.increment_downloads("u1", MIDNIGHT + 2).await.unwrap();

    let stored = store.get("u1").await.unwrap().unwrap();
    assert_eq!(stored.lifetime_download_count, 2);
    assert_eq!(stored.last_download_at, Some(MIDNIGHT + 2));

    assert!(matches!(
        store.increment_downloads("ghost", MIDNIGHT).await,
        Err(EntitlementError::NotFound)
    ));
}

#[tokio::test]
async fn test_admin_helpers() {
    let store = setup_test_db().await;
    store.put(&account("u1", false)).await.unwrap();
    store.put(&account("u2", true)).await.unwrap();

    store.set_tier("u1", Tier::Elevated, MIDNIGHT).await.unwrap();
    store.set_verified("u1", true, MIDNIGHT).await.unwrap();

    let accounts = store.list_accounts().await.unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0].user_id, "u1");
    assert_eq!(accounts[0].tier, Tier::Elevated);
    assert!(accounts[0].email_verified);

    assert!(matches!(
        store.set_tier("ghost", Tier::Standard, MIDNIGHT).await,
        Err(EntitlementError::NotFound)
    ));
    assert!(matches!(
        store.set_verified("ghost", true, MIDNIGHT).await,
        Err(EntitlementError::NotFound)
    ));
}

#[tokio::test]
async fn test_ledger_count_since() {
    let store = setup_test_db().await;
    store.append(&event("u1", MIDNIGHT - 1)).await.unwrap();
    store.append(&event("u1", MIDNIGHT)).await.unwrap();
    store.append(&event("u1", MIDNIGHT + 500)).await.unwrap();
    store.append(&event("u2", MIDNIGHT + 500)).await.unwrap();

    assert_eq!(store.count_since("u1", MIDNIGHT).await.unwrap(), 2);
    assert_eq!(store.count_since("u1", 0).await.unwrap(), 3);
    assert_eq!(store.count_since("nobody", 0).await.unwrap(), 0);

    let events = store.events_since("u1", MIDNIGHT).await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].occurred_at, MIDNIGHT);
    assert_eq!(events[1].context.user_agent.as_deref(), Some("curl/8"));
}

#[tokio::test]
async fn test_list_events_newest_first() {
    let store = setup_test_db().await;
    store.append(&event("u1", MIDNIGHT - 86_400)).await.unwrap();
    store.append(&event("u2", MIDNIGHT + 10)).await.unwrap();
    store.append(&event("u1", MIDNIGHT + 30)).await.unwrap();
    store.append(&event("u3", MIDNIGHT + 20)).await.unwrap();

    let all = store.list_events(None, 100).await.unwrap();
    let seen: Vec<(&str, i64)> = all
        .iter()
        .map(|e| (e.user_id.as_str(), e.occurred_at))
        .collect();
    assert_eq!(
        seen,
        vec![
            ("u1", MIDNIGHT + 30),
            ("u3", MIDNIGHT + 20),
            ("u2", MIDNIGHT + 10),
            ("u1", MIDNIGHT - 86_400),
        ]
    );

    let today = store.list_events(Some(MIDNIGHT), 100).await.unwrap();
    assert_eq!(today.len(), 3);
    assert!(today.iter().all(|e| e.occurred_at >= MIDNIGHT));

    let latest = store.list_events(None, 2).await.unwrap();
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].occurred_at, MIDNIGHT + 30);

    let empty = setup_test_db().await.list_events(None, 10).await.unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn test_append_within_quota() {
    let store = setup_test_db().await;
    store.put(&account("u1", true)).await.unwrap();
    // Yesterday's event does not count.
    store.append(&event("u1", MIDNIGHT - 1)).await.unwrap();

    for expected in 1..=3 {
        match store
            .append_within_quota(&event("u1", MIDNIGHT + 10), MIDNIGHT, 3)
            .await
            .unwrap()
        {
            Append::Appended { count, .. } => assert_eq!(count, expected),
            other => panic!("unexpected {other:?}"),
        }
    }

    let refused = store
        .append_within_quota(&event("u1", MIDNIGHT + 20), MIDNIGHT, 3)
        .await
        .unwrap();
    assert_eq!(refused, Append::QuotaReached { count: 3 });
    assert_eq!(store.count_since("u1", MIDNIGHT).await.unwrap(), 3);
}

#[tokio::test]
async fn test_engine_over_sql() {
    let store = Arc::new(setup_test_db().await);
    store.put(&account("u1", true)).await.unwrap();
    store.put(&account("u2", false)).await.unwrap();

    let clock = Arc::new(ManualClock::new(MIDNIGHT + 3600));
    let engine = EntitlementEngine::with_clock(
        store.clone(),
        store.clone(),
        clock.clone(),
        QuotaPolicy::default(),
    );

    for k in 0..3 {
        assert_eq!(engine.evaluate("u1").await.remaining(), 3 - k);
        assert!(engine.record("u1", ClientContext::default()).await.is_success());
    }
    assert_eq!(
        engine.record("u1", ClientContext::default()).await,
        RecordResult::Denied(DenyReason::QuotaExceeded)
    );
    assert_eq!(
        engine.evaluate("u2").await,
        Verdict::Denied {
            reason: DenyReason::UnverifiedEmail,
            remaining: 0,
            quota: 3
        }
    );

    let stored = store.get("u1").await.unwrap().unwrap();
    assert_eq!(stored.lifetime_download_count, 3);
    assert_eq!(stored.last_download_at, Some(MIDNIGHT + 3600));

    clock.advance(86_400);
    assert_eq!(engine.evaluate("u1").await.remaining(), 3);
}

#[tokio::test]
async fn test_concurrent_records_over_sql() {
    let store = Arc::new(setup_test_db().await);
    store.put(&account("u1", true)).await.unwrap();

    let engine = Arc::new(EntitlementEngine::with_clock(
        store.clone(),
        store.clone(),
        ManualClock::new(MIDNIGHT + 60),
        QuotaPolicy::default(),
    ));

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.record("u1", ClientContext::default()).await })
        })
        .collect();

    let mut granted = 0;
    for handle in handles {
        if handle.await.unwrap().is_success() {
            granted += 1;
        }
    }
    assert_eq!(granted, 3);
    assert_eq!(store.count_since("u1", MIDNIGHT).await.unwrap(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_records_across_connections() {
    // A file database so each pooled connection sees the same data and
    // transactions really overlap.
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("henu.db").display());
    let store = Arc::new(
        SqlStore::connect(
            SqlStoreConfig::new(url)
                .max_connections(8)
                .init_schema(true),
        )
        .await
        .unwrap(),
    );
    store.put(&account("u1", true)).await.unwrap();

    let engine = Arc::new(EntitlementEngine::with_clock(
        store.clone(),
        store.clone(),
        ManualClock::new(MIDNIGHT + 60),
        QuotaPolicy::default(),
    ));

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.record("u1", ClientContext::default()).await })
        })
        .collect();

    let (mut granted, mut denied) = (0, 0);
    for handle in handles {
        match handle.await.unwrap() {
            RecordResult::Success(_) => granted += 1,
            RecordResult::Denied(DenyReason::QuotaExceeded) => denied += 1,
            other => panic!("unexpected {other:?}"),
        }
    }
    assert_eq!(granted, 3);
    assert_eq!(denied, 17);
    assert_eq!(store.count_since("u1", MIDNIGHT).await.unwrap(), 3);
}
