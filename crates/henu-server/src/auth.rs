//! Bearer-token sessions.
//!
//! A bearer token is either one this server issued on a password sign-in
//! or a token the identity provider verifies.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, request::Parts};
use henu_entitlement::{Credentials, Identity, IdentityError, SyncOutcome};
use henu_metrics::{record_identity_sync, record_sign_in};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// An authenticated caller whose account record has been synced.
#[derive(Debug, Clone)]
pub struct Session(pub Identity);

impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = bearer_token(&parts.headers).ok_or(IdentityError::MissingCredentials)?;
        authenticate_bearer(state, token).await.map(Session)
    }
}

/// Resolve a bearer token, trying server-issued sessions first.
///
/// Issued sessions skip identity sync: the account was synced when the
/// token was issued and the stored identity may be older than the record.
pub(crate) async fn authenticate_bearer(state: &AppState, token: &str) -> Result<Identity, ApiError> {
    if let Some(identity) = state.sessions.resolve(token) {
        return Ok(identity);
    }
    sign_in(state, &Credentials::Token(token.to_string())).await
}

/// Token from `Authorization: Bearer <token>`.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Authenticate, then create or refresh the account before anything reads it.
///
/// A failed sync is logged and does not reject the caller; the engine then
/// reports the account as unknown or the store as unavailable.
pub(crate) async fn sign_in(
    state: &AppState,
    credentials: &Credentials,
) -> Result<Identity, ApiError> {
    let identity = match state.identity.authenticate(credentials).await {
        Ok(identity) => {
            record_sign_in("success");
            identity
        }
        Err(e @ IdentityError::Backend(_)) => {
            record_sign_in("error");
            warn!(error = %e, "identity provider unavailable");
            return Err(e.into());
        }
        Err(e) => {
            record_sign_in("rejected");
            debug!(error = %e, "credentials rejected");
            return Err(e.into());
        }
    };

    match state.sync.sync(&identity).await {
        Ok(SyncOutcome::Created) => record_identity_sync("created"),
        Ok(SyncOutcome::Refreshed) => record_identity_sync("refreshed"),
        Err(e) => {
            record_identity_sync("failed");
            warn!(user_id = %identity.user_id, error = %e, "identity sync failed");
        }
    }
    Ok(identity)
}
