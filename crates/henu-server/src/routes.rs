//! HTTP routes.
//!
//! | method | path | auth |
//! |---|---|---|
//! | `GET` | `/health` | none |
//! | `POST` | `/api/session` | bearer, or token/password in the body |
//!
//! A password sign-in returns a `session` token; every `bearer` route
//! accepts it as well as provider tokens.
//! | `DELETE` | `/api/session` | bearer |
//! | `GET` | `/api/downloads/status` | bearer |
//! | `GET` | `/api/downloads/mirrors` | none |
//! | `POST` | `/api/downloads` | bearer |
//! | `POST` | `/api/applications` | none |

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, MatchedPath, Request, State};
use axum::http::header::{ORIGIN, USER_AGENT};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use henu_apply::{SubmitOutcome, TeamApplication};
use henu_entitlement::{
    AccountRecord, AccountStore, ClientContext, Credentials, DenyReason, Identity, IdentityError,
    Receipt, RecordResult, Verdict,
};
use henu_metrics::{
    record_application, record_download, record_error, record_http_request, record_partial_write,
    record_verdict,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::auth::{Session, authenticate_bearer, bearer_token, sign_in};
use crate::error::ApiError;
use crate::sessions::IssuedToken;
use crate::state::AppState;

/// Build the API router.
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/session", post(create_session).delete(end_session))
        .route("/api/downloads", post(create_download))
        .route("/api/downloads/status", get(download_status))
        .route("/api/downloads/mirrors", get(list_mirrors))
        .route("/api/applications", post(submit_application))
        .route_layer(middleware::from_fn(track_requests))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

async fn track_requests(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let start = Instant::now();
    let response = next.run(request).await;
    record_http_request(
        &route,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": henu_core::VERSION }))
}

/// Download permission as shown to the client.
#[derive(Debug, Serialize)]
struct DownloadStatus {
    #[serde(flatten)]
    verdict: Verdict,
    message: String,
    /// Unix time the quota day rolls over.
    resets_at: i64,
}

impl DownloadStatus {
    fn new(state: &AppState, verdict: Verdict) -> Self {
        Self {
            message: verdict.message(),
            resets_at: state.engine.start_of_today() + henu_core::SECS_PER_DAY,
            verdict,
        }
    }
}

async fn evaluate(state: &AppState, user_id: &str) -> DownloadStatus {
    let verdict = state.engine.evaluate(user_id).await;
    record_verdict(verdict.reason().map_or("allowed", DenyReason::code));
    DownloadStatus::new(state, verdict)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SignInRequest {
    token: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Serialize)]
struct SessionView {
    /// Set on password sign-in; send it as the bearer token from then on.
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<IssuedToken>,
    identity: Identity,
    account: Option<AccountRecord>,
    download: DownloadStatus,
}

async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SessionView>, ApiError> {
    let request: SignInRequest = parse_optional(&body)?;
    let (identity, session) = match request {
        SignInRequest {
            email: Some(email),
            password: Some(password),
            ..
        } => {
            let identity = sign_in(&state, &Credentials::Password { email, password }).await?;
            let issued = state.sessions.issue(&identity);
            (identity, Some(issued))
        }
        SignInRequest {
            token: Some(token), ..
        } => (sign_in(&state, &Credentials::Token(token)).await?, None),
        _ => {
            let token = bearer_token(&headers).ok_or(IdentityError::MissingCredentials)?;
            (authenticate_bearer(&state, token).await?, None)
        }
    };

    let account = match state.engine.accounts().get(&identity.user_id).await {
        Ok(account) => account,
        Err(e) => {
            warn!(user_id = %identity.user_id, error = %e, "account lookup failed");
            None
        }
    };
    let download = evaluate(&state, &identity.user_id).await;
    info!(user_id = %identity.user_id, "signed in");

    Ok(Json(SessionView {
        session,
        identity,
        account,
        download,
    }))
}

async fn end_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Session(identity): Session,
) -> Result<StatusCode, ApiError> {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.revoke(token);
    }
    state.identity.sign_out(&identity.user_id).await?;
    info!(user_id = %identity.user_id, "signed out");
    Ok(StatusCode::NO_CONTENT)
}

async fn download_status(
    State(state): State<AppState>,
    Session(identity): Session,
) -> Json<DownloadStatus> {
    Json(evaluate(&state, &identity.user_id).await)
}

#[derive(Debug, Serialize)]
struct MirrorView<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
    recommended: bool,
}

/// Mirror names and published checksums. URLs are only handed out with a
/// recorded download.
async fn list_mirrors(State(state): State<AppState>) -> Json<Value> {
    let mirrors = state
        .downloads
        .mirrors
        .iter()
        .map(|m| MirrorView {
            name: &m.name,
            label: m.label.as_deref(),
            location: m.location.as_deref(),
            recommended: m.recommended,
        })
        .collect::<Vec<_>>();
    Json(json!({ "mirrors": mirrors, "checksums": state.downloads.checksums }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DownloadRequest {
    mirror: Option<String>,
}

#[derive(Debug, Serialize)]
struct DownloadGrant {
    receipt: Receipt,
    mirror: String,
    url: String,
    download: DownloadStatus,
}

async fn create_download(
    State(state): State<AppState>,
    Session(identity): Session,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: DownloadRequest = parse_optional(&body)?;
    let mirror = state
        .downloads
        .mirror(request.mirror.as_deref())
        .ok_or_else(|| match &request.mirror {
            Some(name) => ApiError::BadRequest(format!("unknown mirror {name:?}")),
            None => ApiError::Unavailable("no download mirror is configured".into()),
        })?;

    let context = ClientContext {
        user_agent: header_string(&headers, USER_AGENT),
        origin: header_string(&headers, ORIGIN),
    };
    let user_id = identity.user_id.as_str();

    match state.engine.record(user_id, context).await {
        RecordResult::Success(receipt) => {
            record_download("success");
            if receipt.partial_write {
                record_partial_write();
            }
            info!(user_id, mirror = %mirror.name, event_id = %receipt.event_id, "download granted");
            let grant = DownloadGrant {
                receipt,
                mirror: mirror.name.clone(),
                url: mirror.url.clone(),
                download: evaluate(&state, user_id).await,
            };
            Ok(Json(grant).into_response())
        }
        RecordResult::Denied(reason) => {
            record_download("denied");
            let quota = state.engine.evaluate(user_id).await.quota();
            let status = match reason {
                DenyReason::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
                DenyReason::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                DenyReason::UnknownAccount | DenyReason::UnverifiedEmail => StatusCode::FORBIDDEN,
            };
            let body = DownloadStatus::new(&state, Verdict::denied(reason, quota));
            Ok((status, Json(body)).into_response())
        }
        RecordResult::Failure(failure) => {
            record_download("failure");
            record_error(failure.code());
            warn!(user_id, error = %failure, "download not recorded");
            Err(ApiError::Unavailable(
                Verdict::denied(DenyReason::StoreUnavailable, 0).message(),
            ))
        }
    }
}

async fn submit_application(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SubmitOutcome>), ApiError> {
    let application: TeamApplication = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid request body: {e}")))?;
    let outcome = state.intake.submit(&application).await?;
    record_application(outcome.notified);
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Parse a JSON body, treating an empty body as `T::default()`.
fn parse_optional<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid request body: {e}")))
}

fn header_string(headers: &HeaderMap, name: axum::http::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}
