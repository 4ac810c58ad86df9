//! Data-access traits for accounts and the download ledger.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::EntitlementError;
use crate::record::{AccountRecord, DownloadEvent, Profile};

/// Keyed account record store.
///
/// Implementations must be thread-safe (`Send + Sync`); the backing store
/// is shared with other sessions and devices for the same user.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fetch an account. `Ok(None)` when absent.
    async fn get(&self, user_id: &str) -> Result<Option<AccountRecord>, EntitlementError>;

    /// Insert or replace an account.
    async fn put(&self, record: &AccountRecord) -> Result<(), EntitlementError>;

    /// Insert only if no record exists for `record.user_id`.
    ///
    /// Returns `true` when the record was created.
    async fn insert_if_absent(&self, record: &AccountRecord) -> Result<bool, EntitlementError>;

    /// Overwrite the provider-owned fields of an existing account.
    ///
    /// Tier and counters are never touched. Returns
    /// [`EntitlementError::NotFound`] when the account does not exist.
    async fn refresh_profile(
        &self,
        user_id: &str,
        profile: &Profile,
        at: i64,
    ) -> Result<(), EntitlementError>;

    /// Atomically add one to the lifetime counter and stamp `last_download_at`.
    async fn increment_downloads(&self, user_id: &str, at: i64) -> Result<(), EntitlementError>;
}

/// Outcome of [`DownloadLedger::append_within_quota`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Append {
    /// The event was written. `count` includes it.
    Appended { event_id: String, count: u32 },
    /// Nothing was written; `count` events already exist since the boundary.
    QuotaReached { count: u32 },
}

/// Append-only ledger of granted downloads.
#[async_trait]
pub trait DownloadLedger: Send + Sync {
    /// Append an event unconditionally and return its id.
    async fn append(&self, event: &DownloadEvent) -> Result<String, EntitlementError>;

    /// Count events for `user_id` with `occurred_at >= since`.
    async fn count_since(&self, user_id: &str, since: i64) -> Result<u32, EntitlementError>;

    /// Count events since `since` and append `event` only if fewer than
    /// `quota` exist, as one atomic unit against concurrent writers.
    async fn append_within_quota(
        &self,
        event: &DownloadEvent,
        since: i64,
        quota: u32,
    ) -> Result<Append, EntitlementError>;
}

#[async_trait]
impl<S: AccountStore + ?Sized> AccountStore for Arc<S> {
    #[inline]
    async fn get(&self, user_id: &str) -> Result<Option<AccountRecord>, EntitlementError> {
        (**self).get(user_id).await
    }

    #[inline]
    async fn put(&self, record: &AccountRecord) -> Result<(), EntitlementError> {
        (**self).put(record).await
    }

    #[inline]
    async fn insert_if_absent(&self, record: &AccountRecord) -> Result<bool, EntitlementError> {
        (**self).insert_if_absent(record).await
    }

    #[inline]
    async fn refresh_profile(
        &self,
        user_id: &str,
        profile: &Profile,
        at: i64,
    ) -> Result<(), EntitlementError> {
        (**self).refresh_profile(user_id, profile, at).await
    }

    #[inline]
    async fn increment_downloads(&self, user_id: &str, at: i64) -> Result<(), EntitlementError> {
        (**self).increment_downloads(user_id, at).await
    }
}

#[async_trait]
impl<S: AccountStore + ?Sized> AccountStore for Box<S> {
    #[inline]
    async fn get(&self, user_id: &str) -> Result<Option<AccountRecord>, EntitlementError> {
        (**self).get(user_id).await
    }

    #[inline]
    async fn put(&self, record: &AccountRecord) -> Result<(), EntitlementError> {
        (**self).put(record).await
    }

    #[inline]
    async fn insert_if_absent(&self, record: &AccountRecord) -> Result<bool, EntitlementError> {
        (**self).insert_if_absent(record).await
    }

    #[inline]
    async fn refresh_profile(
        &self,
        user_id: &str,
        profile: &Profile,
        at: i64,
    ) -> Result<(), EntitlementError> {
        (**self).refresh_profile(user_id, profile, at).await
    }

    #[inline]
    async fn increment_downloads(&self, user_id: &str, at: i64) -> Result<(), EntitlementError> {
        (**self).increment_downloads(user_id, at).await
    }
}

#[async_trait]
impl<L: DownloadLedger + ?Sized> DownloadLedger for Arc<L> {
    #[inline]
    async fn append(&self, event: &DownloadEvent) -> Result<String, EntitlementError> {
        (**self).append(event).await
    }

    #[inline]
    async fn count_since(&self, user_id: &str, since: i64) -> Result<u32, EntitlementError> {
        (**self).count_since(user_id, since).await
    }

    #[inline]
    async fn append_within_quota(
        &self,
        event: &DownloadEvent,
        since: i64,
        quota: u32,
    ) -> Result<Append, EntitlementError> {
        (**self).append_within_quota(event, since, quota).await
    }
}

#[async_trait]
impl<L: DownloadLedger + ?Sized> DownloadLedger for Box<L> {
    #[inline]
    async fn append(&self, event: &DownloadEvent) -> Result<String, EntitlementError> {
        (**self).append(event).await
    }

    #[inline]
    async fn count_since(&self, user_id: &str, since: i64) -> Result<u32, EntitlementError> {
        (**self).count_since(user_id, since).await
    }

    #[inline]
    async fn append_within_quota(
        &self,
        event: &DownloadEvent,
        since: i64,
        quota: u32,
    ) -> Result<Append, EntitlementError> {
        (**self).append_within_quota(event, since, quota).await
    }
}
