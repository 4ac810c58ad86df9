//! SQL queries for different databases.
//!
//! PostgreSQL uses `$n` placeholders, MySQL and SQLite use `?`. Where the
//! upsert dialects differ, each database gets its own variant.

// ── Schema ────────────────────────────────────────────────────────

/// Schema statements (PostgreSQL).
pub const SCHEMA_PG: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS henu_accounts (
    user_id VARCHAR(128) PRIMARY KEY,
    email VARCHAR(320) NOT NULL,
    display_name TEXT,
    photo_url TEXT,
    tier VARCHAR(16) NOT NULL DEFAULT 'standard',
    email_verified BOOLEAN NOT NULL DEFAULT FALSE,
    download_count BIGINT NOT NULL DEFAULT 0,
    last_download_at BIGINT,
    created_at BIGINT NOT NULL,
    updated_at BIGINT NOT NULL
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS henu_downloads (
    event_id VARCHAR(36) PRIMARY KEY,
    user_id VARCHAR(128) NOT NULL,
    occurred_at BIGINT NOT NULL,
    user_agent TEXT,
    origin TEXT
)
"#,
    "CREATE INDEX IF NOT EXISTS idx_henu_downloads_user_time ON henu_downloads (user_id, occurred_at)",
];

/// Schema statements (MySQL). The index is declared inline since MySQL
/// has no `CREATE INDEX IF NOT EXISTS`.
pub const SCHEMA_MYSQL: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS henu_accounts (
    user_id VARCHAR(128) PRIMARY KEY,
    email VARCHAR(320) NOT NULL,
    display_name TEXT,
    photo_url TEXT,
    tier VARCHAR(16) NOT NULL DEFAULT 'standard',
    email_verified BOOLEAN NOT NULL DEFAULT FALSE,
    download_count BIGINT NOT NULL DEFAULT 0,
    last_download_at BIGINT NULL,
    created_at BIGINT NOT NULL,
    updated_at BIGINT NOT NULL
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS henu_downloads (
    event_id VARCHAR(36) PRIMARY KEY,
    user_id VARCHAR(128) NOT NULL,
    occurred_at BIGINT NOT NULL,
    user_agent TEXT,
    origin TEXT,
    INDEX idx_henu_downloads_user_time (user_id, occurred_at)
)
"#,
];

/// Schema statements (SQLite).
pub const SCHEMA_SQLITE: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS henu_accounts (
    user_id TEXT PRIMARY KEY,
    email TEXT NOT NULL,
    display_name TEXT,
    photo_url TEXT,
    tier TEXT NOT NULL DEFAULT 'standard',
    email_verified INTEGER NOT NULL DEFAULT 0,
    download_count INTEGER NOT NULL DEFAULT 0,
    last_download_at INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS henu_downloads (
    event_id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    occurred_at INTEGER NOT NULL,
    user_agent TEXT,
    origin TEXT
)
"#,
    "CREATE INDEX IF NOT EXISTS idx_henu_downloads_user_time ON henu_downloads (user_id, occurred_at)",
];

// ── Accounts ──────────────────────────────────────────────────────

/// Fetch one account (PostgreSQL).
pub const GET_ACCOUNT_PG: &str = r#"
SELECT user_id, email, display_name, photo_url, tier, email_verified,
       download_count, last_download_at, created_at, updated_at
FROM henu_accounts
WHERE user_id = $1
"#;

/// Fetch one account (MySQL/SQLite).
pub const GET_ACCOUNT_MYSQL: &str = r#"
SELECT user_id, email, display_name, photo_url, tier, email_verified,
       download_count, last_download_at, created_at, updated_at
FROM henu_accounts
WHERE user_id = ?
"#;

/// All accounts, oldest first.
pub const LIST_ACCOUNTS: &str = r#"
SELECT user_id, email, display_name, photo_url, tier, email_verified,
       download_count, last_download_at, created_at, updated_at
FROM henu_accounts
ORDER BY created_at, user_id
"#;

/// Lock the account row for the rest of the transaction (PostgreSQL).
pub const LOCK_ACCOUNT_PG: &str = "SELECT user_id FROM henu_accounts WHERE user_id = $1 FOR UPDATE";

/// Lock the account row for the rest of the transaction (MySQL).
pub const LOCK_ACCOUNT_MYSQL: &str =
    "SELECT user_id FROM henu_accounts WHERE user_id = ? FOR UPDATE";

/// Insert-or-replace an account (PostgreSQL).
pub const UPSERT_ACCOUNT_PG: &str = r#"
INSERT INTO henu_accounts (user_id, email, display_name, photo_url, tier, email_verified,
                           download_count, last_download_at, created_at, updated_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
ON CONFLICT (user_id) DO UPDATE SET
    email = excluded.email,
    display_name = excluded.display_name,
    photo_url = excluded.photo_url,
    tier = excluded.tier,
    email_verified = excluded.email_verified,
    download_count = excluded.download_count,
    last_download_at = excluded.last_download_at,
    updated_at = excluded.updated_at
"#;

/// Insert-or-replace an account (SQLite).
pub const UPSERT_ACCOUNT_SQLITE: &str = r#"
INSERT INTO henu_accounts (user_id, email, display_name, photo_url, tier, email_verified,
                           download_count, last_download_at, created_at, updated_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
ON CONFLICT (user_id) DO UPDATE SET
    email = excluded.email,
    display_name = excluded.display_name,
    photo_url = excluded.photo_url,
    tier = excluded.tier,
    email_verified = excluded.email_verified,
    download_count = excluded.download_count,
    last_download_at = excluded.last_download_at,
    updated_at = excluded.updated_at
"#;

/// Insert-or-replace an account (MySQL).
pub const UPSERT_ACCOUNT_MYSQL: &str = r#"
INSERT INTO henu_accounts (user_id, email, display_name, photo_url, tier, email_verified,
                           download_count, last_download_at, created_at, updated_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
ON DUPLICATE KEY UPDATE
    email = VALUES(email),
    display_name = VALUES(display_name),
    photo_url = VALUES(photo_url),
    tier = VALUES(tier),
    email_verified = VALUES(email_verified),
    download_count = VALUES(download_count),
    last_download_at = VALUES(last_download_at),
    updated_at = VALUES(updated_at)
"#;

/// Create an account unless one exists (PostgreSQL).
pub const INSERT_ACCOUNT_IF_ABSENT_PG: &str = r#"
INSERT INTO henu_accounts (user_id, email, display_name, photo_url, tier, email_verified,
                           download_count, last_download_at, created_at, updated_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
ON CONFLICT (user_id) DO NOTHING
"#;

/// Create an account unless one exists (SQLite).
pub const INSERT_ACCOUNT_IF_ABSENT_SQLITE: &str = r#"
INSERT OR IGNORE INTO henu_accounts (user_id, email, display_name, photo_url, tier, email_verified,
                                     download_count, last_download_at, created_at, updated_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

/// Create an account unless one exists (MySQL).
pub const INSERT_ACCOUNT_IF_ABSENT_MYSQL: &str = r#"
INSERT IGNORE INTO henu_accounts (user_id, email, display_name, photo_url, tier, email_verified,
                                  download_count, last_download_at, created_at, updated_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

/// Overwrite provider-owned fields (PostgreSQL).
pub const REFRESH_PROFILE_PG: &str = r#"
UPDATE henu_accounts
SET email = $1, display_name = $2, photo_url = $3, email_verified = $4, updated_at = $5
WHERE user_id = $6
"#;

/// Overwrite provider-owned fields (MySQL/SQLite).
pub const REFRESH_PROFILE_MYSQL: &str = r#"
UPDATE henu_accounts
SET email = ?, display_name = ?, photo_url = ?, email_verified = ?, updated_at = ?
WHERE user_id = ?
"#;

/// Bump the lifetime counter (PostgreSQL).
pub const INCREMENT_DOWNLOADS_PG: &str = r#"
UPDATE henu_accounts
SET download_count = download_count + 1, last_download_at = $1, updated_at = $2
WHERE user_id = $3
"#;

/// Bump the lifetime counter (MySQL/SQLite).
pub const INCREMENT_DOWNLOADS_MYSQL: &str = r#"
UPDATE henu_accounts
SET download_count = download_count + 1, last_download_at = ?, updated_at = ?
WHERE user_id = ?
"#;

/// Change tier (PostgreSQL).
pub const SET_TIER_PG: &str =
    "UPDATE henu_accounts SET tier = $1, updated_at = $2 WHERE user_id = $3";

/// Change tier (MySQL/SQLite).
pub const SET_TIER_MYSQL: &str =
    "UPDATE henu_accounts SET tier = ?, updated_at = ? WHERE user_id = ?";

/// Change verification flag (PostgreSQL).
pub const SET_VERIFIED_PG: &str =
    "UPDATE henu_accounts SET email_verified = $1, updated_at = $2 WHERE user_id = $3";

/// Change verification flag (MySQL/SQLite).
pub const SET_VERIFIED_MYSQL: &str =
    "UPDATE henu_accounts SET email_verified = ?, updated_at = ? WHERE user_id = ?";

// ── Ledger ────────────────────────────────────────────────────────

/// Append an event unconditionally (PostgreSQL).
pub const APPEND_EVENT_PG: &str = r#"
INSERT INTO henu_downloads (event_id, user_id, occurred_at, user_agent, origin)
VALUES ($1, $2, $3, $4, $5)
"#;

/// Append an event unconditionally (MySQL/SQLite).
pub const APPEND_EVENT_MYSQL: &str = r#"
INSERT INTO henu_downloads (event_id, user_id, occurred_at, user_agent, origin)
VALUES (?, ?, ?, ?, ?)
"#;

/// Count a user's events since a boundary (PostgreSQL).
pub const COUNT_SINCE_PG: &str =
    "SELECT COUNT(*) AS n FROM henu_downloads WHERE user_id = $1 AND occurred_at >= $2";

/// Count a user's events since a boundary (MySQL/SQLite).
pub const COUNT_SINCE_MYSQL: &str =
    "SELECT COUNT(*) AS n FROM henu_downloads WHERE user_id = ? AND occurred_at >= ?";

/// Append only while the count since the boundary is below the quota (PostgreSQL).
///
/// Binds: event_id, user_id, occurred_at, user_agent, origin, user_id, since, quota.
pub const APPEND_WITHIN_QUOTA_PG: &str = r#"
INSERT INTO henu_downloads (event_id, user_id, occurred_at, user_agent, origin)
SELECT $1, $2, $3, $4, $5
WHERE (SELECT COUNT(*) FROM henu_downloads WHERE user_id = $6 AND occurred_at >= $7) < $8
"#;

/// Append only while the count since the boundary is below the quota (MySQL).
pub const APPEND_WITHIN_QUOTA_MYSQL: &str = r#"
INSERT INTO henu_downloads (event_id, user_id, occurred_at, user_agent, origin)
SELECT ?, ?, ?, ?, ? FROM DUAL
WHERE (SELECT COUNT(*) FROM henu_downloads WHERE user_id = ? AND occurred_at >= ?) < ?
"#;

/// Append only while the count since the boundary is below the quota (SQLite).
pub const APPEND_WITHIN_QUOTA_SQLITE: &str = r#"
INSERT INTO henu_downloads (event_id, user_id, occurred_at, user_agent, origin)
SELECT ?, ?, ?, ?, ?
WHERE (SELECT COUNT(*) FROM henu_downloads WHERE user_id = ? AND occurred_at >= ?) < ?
"#;

/// A user's events since a boundary, oldest first (PostgreSQL).
pub const EVENTS_SINCE_PG: &str = r#"
SELECT event_id, user_id, occurred_at, user_agent, origin
FROM henu_downloads
WHERE user_id = $1 AND occurred_at >= $2
ORDER BY occurred_at, event_id
"#;

/// A user's events since a boundary, oldest first (MySQL/SQLite).
pub const EVENTS_SINCE_MYSQL: &str = r#"
SELECT event_id, user_id, occurred_at, user_agent, origin
FROM henu_downloads
WHERE user_id = ? AND occurred_at >= ?
ORDER BY occurred_at, event_id
"#;

/// Every user's events since a boundary, newest first (PostgreSQL).
///
/// Binds: since, limit.
pub const LIST_EVENTS_PG: &str = r#"
SELECT event_id, user_id, occurred_at, user_agent, origin
FROM henu_downloads
WHERE occurred_at >= $1
ORDER BY occurred_at DESC, event_id DESC
LIMIT $2
"#;

/// Every user's events since a boundary, newest first (MySQL/SQLite).
pub const LIST_EVENTS_MYSQL: &str = r#"
SELECT event_id, user_id, occurred_at, user_agent, origin
FROM henu_downloads
WHERE occurred_at >= ?
ORDER BY occurred_at DESC, event_id DESC
LIMIT ?
"#;
