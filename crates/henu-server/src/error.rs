//! Server and API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use henu_apply::{ApplyError, ValidationErrors};
use henu_entitlement::{EntitlementError, IdentityError};
use henu_metrics::{ERROR_AUTH, ERROR_CONFIG, ERROR_IO, ERROR_STORE_UNAVAILABLE, ERROR_VALIDATION};
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config: {0}")]
    Config(String),
    #[error("store: {0}")]
    Store(#[from] EntitlementError),
    #[error("applications: {0}")]
    Applications(#[from] ApplyError),
}

impl ServerError {
    /// Get the error type string for metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            ServerError::Io(_) => ERROR_IO,
            ServerError::Config(_) => ERROR_CONFIG,
            ServerError::Store(_) | ServerError::Applications(_) => ERROR_STORE_UNAVAILABLE,
        }
    }
}

/// Error answered to an HTTP client as `{"error": code, "message": ...}`.
#[derive(Debug)]
pub enum ApiError {
    /// No or unusable credentials. The message comes from the identity provider.
    Unauthorized(String),
    BadRequest(String),
    /// Form fields failed validation.
    Validation(ValidationErrors),
    /// A backing service is down; retrying may help.
    Unavailable(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => ERROR_AUTH,
            Self::BadRequest(_) | Self::Validation(_) => ERROR_VALIDATION,
            Self::Unavailable(_) => ERROR_STORE_UNAVAILABLE,
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Rejected(message) => Self::Unauthorized(message),
            IdentityError::MissingCredentials => Self::Unauthorized("Please sign in".into()),
            IdentityError::Backend(_) => {
                Self::Unavailable("Sign-in is temporarily unavailable. Please try again".into())
            }
        }
    }
}

impl From<ApplyError> for ApiError {
    fn from(err: ApplyError) -> Self {
        match err {
            ApplyError::Validation(errors) => Self::Validation(errors),
            ApplyError::Backend(_) => {
                Self::Unavailable("Could not submit your application. Please try again".into())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let body = match self {
            Self::Validation(fields) => json!({
                "error": code,
                "message": fields.to_string(),
                "fields": fields,
            }),
            Self::Unauthorized(message) | Self::BadRequest(message) | Self::Unavailable(message) => {
                json!({ "error": code, "message": message })
            }
        };
        (status, Json(body)).into_response()
    }
}
