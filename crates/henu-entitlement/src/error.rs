//! Entitlement and identity error types.

/// Error raised by an account store or download ledger.
///
/// Policy outcomes (unverified email, quota exceeded) are not errors;
/// they are reported through [`Verdict`](crate::Verdict) and
/// [`RecordResult`](crate::RecordResult).
#[derive(Debug, thiserror::Error)]
pub enum EntitlementError {
    /// Backend error (database, network, etc.).
    #[error("backend error: {0}")]
    Backend(String),

    /// Account record not found.
    #[error("account not found")]
    NotFound,

    /// Unrecognised account tier.
    #[error("invalid tier: {0}")]
    InvalidTier(String),
}

impl EntitlementError {
    /// Create a backend error from any error type.
    #[inline]
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<sqlx::Error> for EntitlementError {
    fn from(err: sqlx::Error) -> Self {
        Self::backend(err)
    }
}

/// Error raised by an [`IdentityProvider`](crate::IdentityProvider).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// The provider refused the credentials. The message is shown to the user as-is.
    #[error("{0}")]
    Rejected(String),

    /// No credentials were supplied.
    #[error("missing credentials")]
    MissingCredentials,

    /// The provider could not be reached or answered unexpectedly.
    #[error("identity backend error: {0}")]
    Backend(String),
}

impl IdentityError {
    /// Create a backend error from any error type.
    #[inline]
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}
