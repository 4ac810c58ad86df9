//! Identity Sync: keep account records in step with the identity provider.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::EntitlementError;
use crate::identity::{Identity, SessionEvent};
use crate::record::AccountRecord;
use crate::store::AccountStore;

/// What [`IdentitySync::sync`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A new standard-tier account was created.
    Created,
    /// The existing account's profile fields were refreshed.
    Refreshed,
}

/// Creates or refreshes the account for an authenticated identity.
pub struct IdentitySync<A, C = SystemClock> {
    accounts: A,
    clock: C,
}

impl<A: AccountStore> IdentitySync<A, SystemClock> {
    pub fn new(accounts: A) -> Self {
        Self::with_clock(accounts, SystemClock)
    }
}

impl<A: AccountStore, C: Clock> IdentitySync<A, C> {
    pub fn with_clock(accounts: A, clock: C) -> Self {
        Self { accounts, clock }
    }

    /// Create the account if absent, otherwise refresh its display fields
    /// and verification flag. Tier and counters are never changed.
    ///
    /// Two first sign-ins racing each other both end up refreshing the
    /// single record created by whichever insert won.
    pub async fn sync(&self, identity: &Identity) -> Result<SyncOutcome, EntitlementError> {
        let now = self.clock.now_unix();
        let fresh = AccountRecord::new(identity.user_id.as_str(), &identity.profile, now);

        if self.accounts.insert_if_absent(&fresh).await? {
            info!(user_id = %identity.user_id, "account created");
            return Ok(SyncOutcome::Created);
        }

        self.accounts
            .refresh_profile(&identity.user_id, &identity.profile, now)
            .await?;
        debug!(user_id = %identity.user_id, verified = identity.profile.email_verified, "account refreshed");
        Ok(SyncOutcome::Refreshed)
    }
}

impl<A, C> IdentitySync<A, C>
where
    A: AccountStore + 'static,
    C: Clock + 'static,
{
    /// Run in the background, syncing every `SignedIn` event.
    ///
    /// Stops when the channel closes or `cancel` fires. Sync failures are
    /// logged and do not stop the task.
    pub fn spawn(
        self: Arc<Self>,
        mut events: broadcast::Receiver<SessionEvent>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = cancel.cancelled() => break,
                    event = events.recv() => event,
                };
                match event {
                    Ok(SessionEvent::SignedIn(identity)) => {
                        if let Err(e) = self.sync(&identity).await {
                            warn!(user_id = %identity.user_id, error = %e, "identity sync failed");
                        }
                    }
                    Ok(SessionEvent::SignedOut { user_id }) => {
                        debug!(user_id, "signed out");
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "identity sync lagging; session events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!("identity sync stopped");
        })
    }
}

impl<A, C> std::fmt::Debug for IdentitySync<A, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentitySync").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::clock::ManualClock;
    use crate::memory::MemoryStore;
    use crate::record::Tier;

    fn identity(verified: bool) -> Identity {
        let mut identity = Identity::new("u1", "u1@example.org", verified);
        identity.profile.display_name = Some("Ada".into());
        identity
    }

    #[tokio::test]
    async fn test_first_sign_in_creates_standard_account() {
        let store = Arc::new(MemoryStore::new());
        let sync = IdentitySync::with_clock(store.clone(), ManualClock::new(500));

        assert_eq!(sync.sync(&identity(false)).await.unwrap(), SyncOutcome::Created);

        let record = store.get("u1").await.unwrap().unwrap();
        assert_eq!(record.tier, Tier::Standard);
        assert_eq!(record.lifetime_download_count, 0);
        assert_eq!(record.created_at, 500);
        assert!(!record.email_verified);
    }

    #[tokio::test]
    async fn test_later_sign_in_refreshes_profile_only() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(100));
        let sync = IdentitySync::with_clock(store.clone(), clock.clone());
        sync.sync(&identity(false)).await.unwrap();

        let upgraded = store.get("u1").await.unwrap().unwrap().with_tier(Tier::Elevated);
        store.put(&upgraded).await.unwrap();
        store.increment_downloads("u1", 150).await.unwrap();

        clock.set(200);
        let mut changed = identity(true);
        changed.profile.display_name = Some("Ada L.".into());
        assert_eq!(sync.sync(&changed).await.unwrap(), SyncOutcome::Refreshed);

        let record = store.get("u1").await.unwrap().unwrap();
        assert!(record.email_verified);
        assert_eq!(record.display_name.as_deref(), Some("Ada L."));
        assert_eq!(record.tier, Tier::Elevated);
        assert_eq!(record.lifetime_download_count, 1);
        assert_eq!(record.created_at, 100);
        assert_eq!(record.updated_at, 200);
    }

    #[tokio::test]
    async fn test_concurrent_first_sign_ins_create_once() {
        let store = Arc::new(MemoryStore::new());
        let sync = Arc::new(IdentitySync::new(store.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sync = sync.clone();
                tokio::spawn(async move { sync.sync(&identity(true)).await.unwrap() })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() == SyncOutcome::Created {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.account_count(), 1);
    }

    #[tokio::test]
    async fn test_spawned_task_follows_events() {
        let store = Arc::new(MemoryStore::new());
        let sync = Arc::new(IdentitySync::new(store.clone()));
        let (tx, rx) = broadcast::channel(16);
        let cancel = CancellationToken::new();
        let handle = sync.spawn(rx, cancel.clone());

        tx.send(SessionEvent::SignedIn(identity(true))).unwrap();
        tx.send(SessionEvent::SignedOut {
            user_id: "u1".into(),
        })
        .unwrap();

        for _ in 0..50 {
            if store.account_count() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(store.account_count(), 1);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_spawned_task_stops_on_close() {
        let sync = Arc::new(IdentitySync::new(MemoryStore::new()));
        let (tx, rx) = broadcast::channel(4);
        let handle = sync.spawn(rx, CancellationToken::new());
        drop(tx);
        handle.await.unwrap();
    }
}
