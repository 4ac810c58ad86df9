//! SQL account store and download ledger.
//!
//! Works with PostgreSQL, MySQL and SQLite through SQLx's `Any` driver.
//! Enable the matching feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! henu-entitlement = { version = "0.3", features = ["sql-mysql"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use henu_entitlement::sql::{SqlStore, SqlStoreConfig};
//!
//! let store = SqlStore::connect(
//!     SqlStoreConfig::new("sqlite:henu.db?mode=rwc")
//!         .max_connections(4)
//!         .init_schema(true),
//! ).await?;
//! ```
//!
//! # Database Schema
//!
//! [`SqlStore::init_schema`] creates the tables below (PostgreSQL shown):
//!
//! ```sql
//! CREATE TABLE henu_accounts (
//!     user_id VARCHAR(128) PRIMARY KEY,
//!     email VARCHAR(320) NOT NULL,
//!     display_name TEXT,
//!     photo_url TEXT,
//!     tier VARCHAR(16) NOT NULL DEFAULT 'standard',   -- standard | elevated
//!     email_verified BOOLEAN NOT NULL DEFAULT FALSE,
//!     download_count BIGINT NOT NULL DEFAULT 0,       -- informational only
//!     last_download_at BIGINT,                        -- Unix seconds
//!     created_at BIGINT NOT NULL,
//!     updated_at BIGINT NOT NULL
//! );
//!
//! CREATE TABLE henu_downloads (
//!     event_id VARCHAR(36) PRIMARY KEY,               -- UUID v4
//!     user_id VARCHAR(128) NOT NULL,
//!     occurred_at BIGINT NOT NULL,                    -- server time, Unix seconds
//!     user_agent TEXT,
//!     origin TEXT
//! );
//!
//! CREATE INDEX idx_henu_downloads_user_time ON henu_downloads (user_id, occurred_at);
//! ```

mod backend;
mod config;
mod queries;

#[cfg(test)]
mod tests;

pub use backend::SqlStore;
pub use config::SqlStoreConfig;
pub use henu_core::DatabaseType;
