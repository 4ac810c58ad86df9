//! HTTP API tests.
//!
//! Requests go through the full router with `tower::ServiceExt::oneshot`,
//! backed by the static identity provider and in-memory stores.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use axum::http::{Method, Request, StatusCode};
use henu_apply::{LogNotifier, MemoryApplications};
use henu_config::{DownloadsConfig, MirrorConfig, NotifyConfig};
use henu_entitlement::{
    AccountRecord, ManualClock, MemoryStore, Profile, QuotaPolicy, StaticIdentity, StaticUser,
    Tier, digest_hex,
};
use henu_server::{AppState, Stores, router};
use serde_json::{Value, json};
use tower::ServiceExt;

/// 2026-10-16T00:00:00Z
const MIDNIGHT: i64 = 1_792_108_800;

struct Harness {
    app: Router,
    store: Arc<MemoryStore>,
    applications: Arc<MemoryApplications>,
    clock: Arc<ManualClock>,
}

fn user(user_id: &str, email: &str, verified: bool) -> StaticUser {
    StaticUser {
        user_id: user_id.into(),
        profile: Profile {
            email: email.into(),
            email_verified: verified,
            display_name: None,
            photo_url: None,
        },
        token_sha224: Some(digest_hex(&format!("{user_id}-token"))),
        password_sha224: Some(digest_hex("correct horse")),
    }
}

fn mirror(name: &str, recommended: bool) -> MirrorConfig {
    MirrorConfig {
        name: name.into(),
        label: None,
        url: format!("https://{name}.example.org/henu-os.iso"),
        location: None,
        recommended,
    }
}

fn harness() -> Harness {
    let clock = Arc::new(ManualClock::new(MIDNIGHT + 3_600));
    let elevated = AccountRecord::new(
        "grace",
        &Profile {
            email: "grace@example.org".into(),
            email_verified: true,
            ..Profile::default()
        },
        MIDNIGHT - 86_400,
    )
    .with_tier(Tier::Elevated);
    let store = Arc::new(MemoryStore::new().with_account(elevated));
    let applications = Arc::new(MemoryApplications::new());

    let identity = StaticIdentity::new(vec![
        user("ada", "ada@example.org", true),
        user("grace", "grace@example.org", true),
        user("linus", "linus@example.org", false),
    ]);
    let mut downloads = DownloadsConfig {
        mirrors: vec![mirror("github", true), mirror("sourceforge", false)],
        ..DownloadsConfig::default()
    };
    downloads
        .checksums
        .insert("sha256".into(), "9f86d081884c7d65".into());

    let state = AppState::new(
        Arc::new(identity),
        Stores {
            accounts: store.clone(),
            ledger: store.clone(),
            applications: applications.clone(),
        },
        Arc::new(LogNotifier),
        &NotifyConfig::default(),
        downloads,
        QuotaPolicy::default(),
        clock.clone(),
    );
    Harness {
        app: router(state, 64 * 1024),
        store,
        applications,
        clock,
    }
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_AGENT, "henu-tests");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn download(h: &Harness, token: &str) -> (StatusCode, Value) {
    send(&h.app, Method::POST, "/api/downloads", Some(token), None).await
}

async fn status(h: &Harness, token: &str) -> Value {
    let (code, body) = send(&h.app, Method::GET, "/api/downloads/status", Some(token), None).await;
    assert_eq!(code, StatusCode::OK);
    body
}

#[tokio::test]
async fn health_reports_version() {
    let h = harness();
    let (code, body) = send(&h.app, Method::GET, "/health", None, None).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], henu_core::VERSION);
}

#[tokio::test]
async fn missing_or_bad_token_is_unauthorized() {
    let h = harness();

    let (code, body) = send(&h.app, Method::GET, "/api/downloads/status", None, None).await;
    assert_eq!(code, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "auth");

    let (code, body) = download(&h, "forged").await;
    assert_eq!(code, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired session");
    assert!(h.store.events_for("ada").is_empty());
}

#[tokio::test]
async fn first_request_creates_standard_account() {
    let h = harness();
    assert!(h.store.events_for("ada").is_empty());

    let body = status(&h, "ada-token").await;
    assert_eq!(body["status"], "allowed");
    assert_eq!(body["remaining"], 3);
    assert_eq!(body["quota"], 3);
    assert_eq!(body["resets_at"], MIDNIGHT + 86_400);
    assert_eq!(body["message"], "3 downloads remaining today");
}

#[tokio::test]
async fn standard_quota_is_enforced_and_resets_next_day() {
    let h = harness();

    for expected in [2, 1, 0] {
        let (code, body) = download(&h, "ada-token").await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["receipt"]["remaining"], expected);
        assert_eq!(body["receipt"]["partial_write"], false);
        assert_eq!(body["mirror"], "github");
        assert_eq!(body["url"], "https://github.example.org/henu-os.iso");
    }

    let (code, body) = download(&h, "ada-token").await;
    assert_eq!(code, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["status"], "denied");
    assert_eq!(body["reason"], "quota_exceeded");
    assert!(body.get("url").is_none());
    assert_eq!(h.store.events_for("ada").len(), 3);

    let body = status(&h, "ada-token").await;
    assert_eq!(body["reason"], "quota_exceeded");
    assert_eq!(body["remaining"], 0);

    // One second before the boundary still counts as today.
    h.clock.set(MIDNIGHT + 86_399);
    assert_eq!(status(&h, "ada-token").await["remaining"], 0);

    h.clock.set(MIDNIGHT + 86_400);
    let body = status(&h, "ada-token").await;
    assert_eq!(body["status"], "allowed");
    assert_eq!(body["remaining"], 3);
}

#[tokio::test]
async fn elevated_account_keeps_tier_and_gets_ten() {
    let h = harness();
    let body = status(&h, "grace-token").await;
    assert_eq!(body["quota"], 10);
    assert_eq!(body["remaining"], 10);

    let (code, body) = download(&h, "grace-token").await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["download"]["remaining"], 9);
}

#[tokio::test]
async fn unverified_email_is_forbidden() {
    let h = harness();
    let body = status(&h, "linus-token").await;
    assert_eq!(body["reason"], "unverified_email");

    let (code, body) = download(&h, "linus-token").await;
    assert_eq!(code, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "unverified_email");
    assert_eq!(body["message"], "Please verify your email address first");
    assert!(h.store.events_for("linus").is_empty());
}

#[tokio::test]
async fn concurrent_downloads_never_exceed_quota() {
    let h = harness();
    // Create the account first so every request races on the ledger only.
    status(&h, "ada-token").await;

    let mut tasks = Vec::new();
    for _ in 0..12 {
        let app = h.app.clone();
        tasks.push(tokio::spawn(async move {
            send(&app, Method::POST, "/api/downloads", Some("ada-token"), None)
                .await
                .0
        }));
    }
    let mut granted = 0;
    for task in tasks {
        match task.await.unwrap() {
            StatusCode::OK => granted += 1,
            code => assert_eq!(code, StatusCode::TOO_MANY_REQUESTS),
        }
    }
    assert_eq!(granted, 3);
    assert_eq!(h.store.events_for("ada").len(), 3);
}

#[tokio::test]
async fn mirrors_hide_urls_until_download() {
    let h = harness();
    let (code, body) = send(&h.app, Method::GET, "/api/downloads/mirrors", None, None).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["mirrors"].as_array().unwrap().len(), 2);
    assert!(body["mirrors"][0].get("url").is_none());
    assert_eq!(body["checksums"]["sha256"], "9f86d081884c7d65");

    let (code, _) = send(
        &h.app,
        Method::POST,
        "/api/downloads",
        Some("ada-token"),
        Some(json!({ "mirror": "ftp" })),
    )
    .await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert!(h.store.events_for("ada").is_empty());

    let (code, body) = send(
        &h.app,
        Method::POST,
        "/api/downloads",
        Some("ada-token"),
        Some(json!({ "mirror": "sourceforge" })),
    )
    .await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["url"], "https://sourceforge.example.org/henu-os.iso");

    let events = h.store.events_for("ada");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].context.user_agent.as_deref(), Some("henu-tests"));
}

#[tokio::test]
async fn password_sign_in_returns_account() {
    let h = harness();
    let (code, body) = send(
        &h.app,
        Method::POST,
        "/api/session",
        None,
        Some(json!({ "email": "ADA@example.org", "password": "correct horse" })),
    )
    .await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["identity"]["user_id"], "ada");
    assert_eq!(body["account"]["tier"], "standard");
    assert_eq!(body["account"]["lifetime_download_count"], 0);
    assert_eq!(body["download"]["remaining"], 3);

    let (code, body) = send(
        &h.app,
        Method::POST,
        "/api/session",
        None,
        Some(json!({ "email": "ada@example.org", "password": "wrong" })),
    )
    .await;
    assert_eq!(code, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn password_session_token_unlocks_downloads() {
    let h = harness();
    let (code, body) = send(
        &h.app,
        Method::POST,
        "/api/session",
        None,
        Some(json!({ "email": "ada@example.org", "password": "correct horse" })),
    )
    .await;
    assert_eq!(code, StatusCode::OK);
    let token = body["session"]["token"].as_str().unwrap().to_string();
    assert_eq!(
        body["session"]["expires_at"],
        MIDNIGHT + 3_600 + 7 * 86_400
    );

    let (code, body) = download(&h, &token).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["download"]["remaining"], 2);
    assert_eq!(h.store.events_for("ada").len(), 1);

    assert_eq!(status(&h, &token).await["remaining"], 2);

    // Re-posting the issued token refreshes the view without a new session.
    let (code, body) = send(&h.app, Method::POST, "/api/session", Some(&token), None).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["identity"]["user_id"], "ada");
    assert!(body.get("session").is_none());

    let (code, _) = send(&h.app, Method::DELETE, "/api/session", Some(&token), None).await;
    assert_eq!(code, StatusCode::NO_CONTENT);
    let (code, _) = download(&h, &token).await;
    assert_eq!(code, StatusCode::UNAUTHORIZED);
    assert_eq!(h.store.events_for("ada").len(), 1);
}

#[tokio::test]
async fn bearer_sign_in_and_sign_out() {
    let h = harness();
    let (code, body) = send(&h.app, Method::POST, "/api/session", Some("grace-token"), None).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["account"]["tier"], "elevated");

    let (code, body) = send(&h.app, Method::DELETE, "/api/session", Some("grace-token"), None).await;
    assert_eq!(code, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (code, _) = send(&h.app, Method::POST, "/api/session", None, None).await;
    assert_eq!(code, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn applications_are_validated_and_stored() {
    let h = harness();
    let (code, body) = send(
        &h.app,
        Method::POST,
        "/api/applications",
        None,
        Some(json!({ "name": "Ada", "email": "not-an-email" })),
    )
    .await;
    assert_eq!(code, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation");
    assert_eq!(body["fields"]["email"], "Please enter a valid email");
    assert_eq!(body["fields"]["phone"], "Phone number is required");
    assert!(h.applications.is_empty());

    let skills: Vec<String> = (1..=7).map(|i| format!("skill-{i}")).collect();
    let (code, body) = send(
        &h.app,
        Method::POST,
        "/api/applications",
        None,
        Some(json!({
            "name": "Ada Lovelace",
            "phone": "+44 20 0000 0000",
            "email": "ada@example.org",
            "address": "London",
            "skills": skills,
            "photo_url": "https://files.example.org/ada.png",
            "resume_url": "https://files.example.org/ada.pdf",
        })),
    )
    .await;
    assert_eq!(code, StatusCode::CREATED);
    assert_eq!(body["notified"], true);
    assert_eq!(h.applications.len(), 1);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let h = harness();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/applications")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
