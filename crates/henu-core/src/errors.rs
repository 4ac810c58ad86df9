//! Error type constants for metrics and logging.
//!
//! These constants provide consistent error classification across all crates.

/// Account record does not exist yet.
pub const ERROR_UNKNOWN_ACCOUNT: &str = "unknown_account";
/// Email address has not been verified.
pub const ERROR_UNVERIFIED_EMAIL: &str = "unverified_email";
/// Daily quota consumed.
pub const ERROR_QUOTA_EXCEEDED: &str = "quota_exceeded";
/// Backing store unreachable or failed.
pub const ERROR_STORE_UNAVAILABLE: &str = "store_unavailable";
/// Ledger write committed but the account counter update failed.
pub const ERROR_PARTIAL_WRITE: &str = "partial_write";
/// Authentication error.
pub const ERROR_AUTH: &str = "auth";
/// Request validation error.
pub const ERROR_VALIDATION: &str = "validation";
/// Outbound notification error.
pub const ERROR_NOTIFY: &str = "notify";
/// Configuration error.
pub const ERROR_CONFIG: &str = "config";
/// I/O error.
pub const ERROR_IO: &str = "io";
