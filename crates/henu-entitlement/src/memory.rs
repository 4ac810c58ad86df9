//! In-memory account store and download ledger.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::error::EntitlementError;
use crate::record::{AccountRecord, DownloadEvent, Profile};
use crate::store::{AccountStore, Append, DownloadLedger};

/// Process-local implementation of both storage boundaries.
///
/// Suitable for tests and single-node deployments without a database.
/// Everything is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<String, AccountRecord>>,
    events: Mutex<Vec<DownloadEvent>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: seed an account.
    pub fn with_account(self, record: AccountRecord) -> Self {
        self.accounts.write().insert(record.user_id.clone(), record);
        self
    }

    /// Number of accounts held.
    #[inline]
    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }

    /// Snapshot of every event for a user, oldest first.
    pub fn events_for(&self, user_id: &str) -> Vec<DownloadEvent> {
        let mut events: Vec<_> = self
            .events
            .lock()
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.occurred_at);
        events
    }

    fn count_locked(events: &[DownloadEvent], user_id: &str, since: i64) -> u32 {
        let n = events
            .iter()
            .filter(|e| e.user_id == user_id && e.occurred_at >= since)
            .count();
        u32::try_from(n).unwrap_or(u32::MAX)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn get(&self, user_id: &str) -> Result<Option<AccountRecord>, EntitlementError> {
        Ok(self.accounts.read().get(user_id).cloned())
    }

    async fn put(&self, record: &AccountRecord) -> Result<(), EntitlementError> {
        self.accounts
            .write()
            .insert(record.user_id.clone(), record.clone());
        Ok(())
    }

    async fn insert_if_absent(&self, record: &AccountRecord) -> Result<bool, EntitlementError> {
        let mut accounts = self.accounts.write();
        if accounts.contains_key(&record.user_id) {
            return Ok(false);
        }
        accounts.insert(record.user_id.clone(), record.clone());
        Ok(true)
    }

    async fn refresh_profile(
        &self,
        user_id: &str,
        profile: &Profile,
        at: i64,
    ) -> Result<(), EntitlementError> {
        let mut accounts = self.accounts.write();
        let record = accounts.get_mut(user_id).ok_or(EntitlementError::NotFound)?;
        record.apply_profile(profile, at);
        Ok(())
    }

    async fn increment_downloads(&self, user_id: &str, at: i64) -> Result<(), EntitlementError> {
        let mut accounts = self.accounts.write();
        let record = accounts.get_mut(user_id).ok_or(EntitlementError::NotFound)?;
        record.lifetime_download_count += 1;
        record.last_download_at = Some(at);
        record.updated_at = at;
        Ok(())
    }
}

#[async_trait]
impl DownloadLedger for MemoryStore {
    async fn append(&self, event: &DownloadEvent) -> Result<String, EntitlementError> {
        self.events.lock().push(event.clone());
        Ok(event.event_id.clone())
    }

    async fn count_since(&self, user_id: &str, since: i64) -> Result<u32, EntitlementError> {
        Ok(Self::count_locked(&self.events.lock(), user_id, since))
    }

    async fn append_within_quota(
        &self,
        event: &DownloadEvent,
        since: i64,
        quota: u32,
    ) -> Result<Append, EntitlementError> {
        // Count and push under one guard so concurrent sessions serialize here.
        let mut events = self.events.lock();
        let count = Self::count_locked(&events, &event.user_id, since);
        if count >= quota {
            return Ok(Append::QuotaReached { count });
        }
        events.push(event.clone());
        Ok(Append::Appended {
            event_id: event.event_id.clone(),
            count: count + 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ClientContext, Tier};

    fn account(user_id: &str) -> AccountRecord {
        let profile = Profile {
            email: format!("{user_id}@example.org"),
            email_verified: true,
            ..Profile::default()
        };
        AccountRecord::new(user_id, &profile, 0)
    }

    fn event(user_id: &str, at: i64) -> DownloadEvent {
        DownloadEvent::new(user_id, at, ClientContext::default())
    }

    #[tokio::test]
    async fn test_insert_if_absent() {
        let store = MemoryStore::new();
        assert!(store.insert_if_absent(&account("u1")).await.unwrap());

        let elevated = account("u1").with_tier(Tier::Elevated);
        assert!(!store.insert_if_absent(&elevated).await.unwrap());
        assert_eq!(store.get("u1").await.unwrap().unwrap().tier, Tier::Standard);
        assert_eq!(store.account_count(), 1);
    }

    #[tokio::test]
    async fn test_refresh_missing_account() {
        let store = MemoryStore::new();
        let result = store.refresh_profile("ghost", &Profile::default(), 1).await;
        assert!(matches!(result, Err(EntitlementError::NotFound)));
    }

    #[tokio::test]
    async fn test_increment_downloads() {
        let store = MemoryStore::new().with_account(account("u1"));
        store.increment_downloads("u1", 50).await.unwrap();
        store.increment_downloads("u1", 60).await.unwrap();

        let record = store.get("u1").await.unwrap().unwrap();
        assert_eq!(record.lifetime_download_count, 2);
        assert_eq!(record.last_download_at, Some(60));
    }

    #[tokio::test]
    async fn test_count_since_filters_user_and_time() {
        let store = MemoryStore::new();
        store.append(&event("u1", 99)).await.unwrap();
        store.append(&event("u1", 100)).await.unwrap();
        store.append(&event("u1", 150)).await.unwrap();
        store.append(&event("u2", 150)).await.unwrap();

        assert_eq!(store.count_since("u1", 100).await.unwrap(), 2);
        assert_eq!(store.count_since("u2", 100).await.unwrap(), 1);
        assert_eq!(store.count_since("u3", 0).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_append_within_quota() {
        let store = MemoryStore::new();
        for expected in 1..=2 {
            match store.append_within_quota(&event("u1", 10), 0, 2).await.unwrap() {
                Append::Appended { count, .. } => assert_eq!(count, expected),
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(
            store.append_within_quota(&event("u1", 10), 0, 2).await.unwrap(),
            Append::QuotaReached { count: 2 }
        );
        assert_eq!(store.events_for("u1").len(), 2);
    }
}
