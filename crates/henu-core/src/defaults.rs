//! Default configuration values.
//!
//! Centralized default constants for use across all crates.

// ============================================================================
// Quota Defaults
// ============================================================================

/// Daily downloads permitted for a standard account.
pub const DEFAULT_STANDARD_DAILY_QUOTA: u32 = 3;
/// Daily downloads permitted for an elevated account.
pub const DEFAULT_ELEVATED_DAILY_QUOTA: u32 = 10;
/// Offset of the quota reference zone from UTC, in seconds (0 = UTC midnight).
pub const DEFAULT_QUOTA_UTC_OFFSET_SECS: i64 = 0;
/// Seconds in one quota day.
pub const SECS_PER_DAY: i64 = 24 * 60 * 60;

// ============================================================================
// Server Defaults
// ============================================================================

/// Default HTTP listen address.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";
/// Default graceful shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;
/// Default maximum request body size (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1 << 20;
/// Default lifetime of a server-issued session token (7 days).
pub const DEFAULT_SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;

// ============================================================================
// Storage Defaults
// ============================================================================

/// Default maximum pooled database connections.
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
/// Default minimum pooled database connections.
pub const DEFAULT_DB_MIN_CONNECTIONS: u32 = 1;
/// Default database acquire timeout in seconds.
pub const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Identity / Notification Defaults
// ============================================================================

/// Default timeout for calls to a remote identity service, in seconds.
pub const DEFAULT_IDENTITY_TIMEOUT_SECS: u64 = 10;
/// Default EmailJS-compatible REST endpoint.
pub const DEFAULT_NOTIFY_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";
/// Default timeout for outbound notifications, in seconds.
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 15;

// ============================================================================
// Team Application Limits
// ============================================================================

/// Minimum number of skills on a team application.
pub const MIN_APPLICATION_SKILLS: usize = 7;
/// Maximum number of skills on a team application.
pub const MAX_APPLICATION_SKILLS: usize = 14;
