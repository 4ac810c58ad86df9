//! Download entitlement engine for HENU OS.
//!
//! Decides whether an authenticated user may download the installer right
//! now and records each granted download in an append-only ledger. Standard
//! accounts get 3 downloads per quota day, elevated accounts 10, and only
//! accounts with a verified email address qualify at all.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use henu_entitlement::{
//!     ClientContext, EntitlementEngine, Identity, IdentitySync, MemoryStore, QuotaPolicy,
//! };
//!
//! # async fn example() -> Result<(), henu_entitlement::EntitlementError> {
//! let store = Arc::new(MemoryStore::new());
//! IdentitySync::new(store.clone())
//!     .sync(&Identity::new("uid-1", "ada@example.org", true))
//!     .await?;
//!
//! let engine = EntitlementEngine::new(store.clone(), store, QuotaPolicy::default());
//! assert_eq!(engine.evaluate("uid-1").await.remaining(), 3);
//!
//! let result = engine.record("uid-1", ClientContext::default()).await;
//! assert_eq!(result.receipt().map(|r| r.remaining), Some(2));
//! # Ok(())
//! # }
//! ```

pub mod cli;
mod engine;
mod error;
mod hash;
pub mod identity;
mod memory;
mod policy;
mod record;
pub mod sql;
pub mod store;
mod sync;
mod verdict;

pub use cli::AdminArgs;
pub use henu_core::clock;
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::EntitlementEngine;
pub use error::{EntitlementError, IdentityError};
pub use hash::{digest_hex, digest_matches};
pub use identity::{
    Credentials, HttpIdentity, Identity, IdentityProvider, SessionEvent, StaticIdentity,
    StaticUser,
};
pub use memory::MemoryStore;
pub use policy::QuotaPolicy;
pub use record::{AccountRecord, ClientContext, DownloadEvent, Profile, Tier};
pub use store::{AccountStore, Append, DownloadLedger};
pub use sync::{IdentitySync, SyncOutcome};
pub use verdict::{DenyReason, Receipt, RecordFailure, RecordResult, Verdict};
