//! Application intake error types.

use crate::application::ValidationErrors;

/// Error raised while submitting or storing a team application.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    /// One or more fields failed validation. Nothing was stored.
    #[error("invalid application: {0}")]
    Validation(ValidationErrors),

    /// Backend error (database, etc.).
    #[error("backend error: {0}")]
    Backend(String),
}

impl ApplyError {
    /// Create a backend error from any error type.
    #[inline]
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<sqlx::Error> for ApplyError {
    fn from(err: sqlx::Error) -> Self {
        Self::backend(err)
    }
}

/// Error raised by a [`Notifier`](crate::Notifier).
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The notification service answered with a non-success status.
    #[error("notification rejected: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The service could not be reached.
    #[error("notification transport error: {0}")]
    Transport(String),
}

impl NotifyError {
    /// Create a transport error from any error type.
    #[inline]
    pub fn transport<E: std::fmt::Display>(err: E) -> Self {
        Self::Transport(err.to_string())
    }
}
