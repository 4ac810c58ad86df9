//! The entitlement engine.
//!
//! [`EntitlementEngine`] is the single authority for "may this user download
//! now?" and "record that a download happened". It holds no quota state of
//! its own: every call re-reads the account and re-counts the ledger.
//!
//! `record` re-verifies the account and writes through
//! [`DownloadLedger::append_within_quota`], so two sessions racing on the
//! last remaining download cannot both succeed.

use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::EntitlementError;
use crate::policy::QuotaPolicy;
use crate::record::{AccountRecord, ClientContext, DownloadEvent};
use crate::store::{AccountStore, Append, DownloadLedger};
use crate::verdict::{DenyReason, Receipt, RecordFailure, RecordResult, Verdict};


/// Quota gate over an [`AccountStore`] and a [`DownloadLedger`].
///
/// # Type parameters
///
/// - `A`: account store
/// - `L`: download ledger (often the same backend as `A`, shared via `Arc`)
/// - `C`: time source, [`SystemClock`] unless testing
pub struct EntitlementEngine<A, L, C = SystemClock> {
    accounts: A,
    ledger: L,
    clock: C,
    policy: QuotaPolicy,
}

impl<A: AccountStore, L: DownloadLedger> EntitlementEngine<A, L, SystemClock> {
    /// Create an engine on the wall clock.
    pub fn new(accounts: A, ledger: L, policy: QuotaPolicy) -> Self {
        Self::with_clock(accounts, ledger, SystemClock, policy)
    }
}

impl<A: AccountStore, L: DownloadLedger, C: Clock> EntitlementEngine<A, L, C> {
    /// Create an engine with an explicit time source.
    pub fn with_clock(accounts: A, ledger: L, clock: C, policy: QuotaPolicy) -> Self {
        Self {
            accounts,
            ledger,
            clock,
            policy,
        }
    }

    /// Get a reference to the account store.
    pub fn accounts(&self) -> &A {
        &self.accounts
    }

    /// Get a reference to the download ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Get the quota policy.
    pub fn policy(&self) -> QuotaPolicy {
        self.policy
    }

    /// Unix time of the current quota day's start.
    pub fn start_of_today(&self) -> i64 {
        self.policy.start_of_day(self.clock.now_unix())
    }

    /// Decide whether `user_id` may download right now. Read-only.
    ///
    /// Store failures fail closed as [`DenyReason::StoreUnavailable`].
    pub async fn evaluate(&self, user_id: &str) -> Verdict {
        let account = match self.load(user_id).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                debug!(user_id, "evaluate: no account record");
                return Verdict::denied(DenyReason::UnknownAccount, 0);
            }
            Err(_) => return Verdict::denied(DenyReason::StoreUnavailable, 0),
        };

        let quota = self.policy.quota_for(account.tier);
        if !account.email_verified {
            return Verdict::denied(DenyReason::UnverifiedEmail, quota);
        }

        let since = self.start_of_today();
        match self.ledger.count_since(user_id, since).await {
            Ok(count) => {
                let verdict = Verdict::from_count(quota, count);
                debug!(user_id, count, quota, remaining = verdict.remaining(), "evaluated");
                verdict
            }
            Err(e) => {
                warn!(user_id, error = %e, "download ledger count failed");
                Verdict::denied(DenyReason::StoreUnavailable, quota)
            }
        }
    }

    /// Record a download for `user_id`, re-checking policy in the same step.
    ///
    /// The ledger event is authoritative. If it commits but the account
    /// counter update fails, the result is still a success with
    /// [`Receipt::partial_write`] set.
    pub async fn record(&self, user_id: &str, context: ClientContext) -> RecordResult {
        let account = match self.load(user_id).await {
            Ok(Some(account)) => account,
            Ok(None) => return RecordResult::Denied(DenyReason::UnknownAccount),
            Err(e) => return RecordResult::Failure(RecordFailure::AccountRead(e.to_string())),
        };
        if !account.email_verified {
            return RecordResult::Denied(DenyReason::UnverifiedEmail);
        }

        let quota = self.policy.quota_for(account.tier);
        let now = self.clock.now_unix();
        let since = self.policy.start_of_day(now);
        let event = DownloadEvent::new(user_id, now, context);

        match self.ledger.append_within_quota(&event, since, quota).await {
            Ok(Append::Appended { event_id, count }) => {
                let partial_write = !self.bump_counter(user_id, now).await;
                let remaining = quota.saturating_sub(count);
                info!(user_id, event_id = %event_id, remaining, "download recorded");
                RecordResult::Success(Receipt {
                    event_id,
                    occurred_at: now,
                    remaining,
                    partial_write,
                })
            }
            Ok(Append::QuotaReached { count }) => {
                info!(user_id, count, quota, "download refused: daily quota reached");
                RecordResult::Denied(DenyReason::QuotaExceeded)
            }
            Err(e) => {
                warn!(user_id, error = %e, "download ledger write failed");
                RecordResult::Failure(RecordFailure::LedgerWrite(e.to_string()))
            }
        }
    }

    /// Append and count without re-checking the account or quota.
    ///
    /// This is the check-then-act protocol that trusts an earlier
    /// [`evaluate`](Self::evaluate). Concurrent callers can over-grant; use
    /// [`record`](Self::record) for anything that unlocks an asset.
    pub async fn record_unchecked(&self, user_id: &str, context: ClientContext) -> RecordResult {
        let now = self.clock.now_unix();
        let event = DownloadEvent::new(user_id, now, context);

        let event_id = match self.ledger.append(&event).await {
            Ok(id) => id,
            Err(e) => {
                warn!(user_id, error = %e, "download ledger write failed");
                return RecordResult::Failure(RecordFailure::LedgerWrite(e.to_string()));
            }
        };
        let partial_write = !self.bump_counter(user_id, now).await;
        let remaining = self.evaluate(user_id).await.remaining();

        RecordResult::Success(Receipt {
            event_id,
            occurred_at: now,
            remaining,
            partial_write,
        })
    }

    async fn load(&self, user_id: &str) -> Result<Option<AccountRecord>, EntitlementError> {
        self.accounts.get(user_id).await.inspect_err(|e| {
            warn!(user_id, error = %e, "account lookup failed");
        })
    }

    /// Returns `false` when the counter could not be updated.
    async fn bump_counter(&self, user_id: &str, at: i64) -> bool {
        match self.accounts.increment_downloads(user_id, at).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    user_id,
                    error = %e,
                    kind = henu_core::ERROR_PARTIAL_WRITE,
                    "download counter update failed; ledger event kept"
                );
                false
            }
        }
    }
}

impl<A, L, C> std::fmt::Debug for EntitlementEngine<A, L, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitlementEngine")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
