//! Storage boundaries consumed by the entitlement engine.
//!
//! This module provides:
//!
//! - [`AccountStore`]: keyed account records (one per user)
//! - [`DownloadLedger`]: append-only download events, authoritative for quota counting
//! - [`Append`]: outcome of a quota-guarded ledger append
//!
//! # Adding a new backend
//!
//! ```ignore
//! use henu_entitlement::store::{AccountStore, DownloadLedger};
//!
//! struct MyStore { /* ... */ }
//!
//! #[async_trait::async_trait]
//! impl DownloadLedger for MyStore {
//!     async fn append(&self, event: &DownloadEvent) -> Result<String, EntitlementError> { todo!() }
//!     async fn count_since(&self, user_id: &str, since: i64) -> Result<u32, EntitlementError> { todo!() }
//!     async fn append_within_quota(&self, event: &DownloadEvent, since: i64, quota: u32)
//!         -> Result<Append, EntitlementError> { todo!() }
//! }
//! ```

mod traits;

pub use traits::{AccountStore, Append, DownloadLedger};
