//! Outcomes of `evaluate` and `record`.

use henu_core::{
    ERROR_QUOTA_EXCEEDED, ERROR_STORE_UNAVAILABLE, ERROR_UNKNOWN_ACCOUNT, ERROR_UNVERIFIED_EMAIL,
};
use serde::{Deserialize, Serialize};

/// Why a download is not permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No account record yet; identity sync has not run.
    UnknownAccount,
    /// The identity provider has not confirmed the email address.
    UnverifiedEmail,
    /// Today's quota is used up. Resets at the next day boundary.
    QuotaExceeded,
    /// A store could not be read. Always fails closed.
    StoreUnavailable,
}

impl DenyReason {
    /// Stable code for logs, metrics and API payloads.
    pub fn code(self) -> &'static str {
        match self {
            Self::UnknownAccount => ERROR_UNKNOWN_ACCOUNT,
            Self::UnverifiedEmail => ERROR_UNVERIFIED_EMAIL,
            Self::QuotaExceeded => ERROR_QUOTA_EXCEEDED,
            Self::StoreUnavailable => ERROR_STORE_UNAVAILABLE,
        }
    }

    /// Whether retrying shortly may succeed.
    pub fn is_transient(self) -> bool {
        matches!(self, Self::StoreUnavailable)
    }
}

/// Answer to "can this user download now?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Allowed {
        remaining: u32,
        quota: u32,
    },
    Denied {
        reason: DenyReason,
        /// Always 0 for a denial.
        remaining: u32,
        /// The account's daily quota, or 0 when it could not be determined.
        quota: u32,
    },
}

impl Verdict {
    /// Build a verdict from today's ledger count.
    pub fn from_count(quota: u32, count: u32) -> Self {
        let remaining = quota.saturating_sub(count);
        if remaining > 0 {
            Self::Allowed { remaining, quota }
        } else {
            Self::denied(DenyReason::QuotaExceeded, quota)
        }
    }

    /// Build a denial.
    #[inline]
    pub fn denied(reason: DenyReason, quota: u32) -> Self {
        Self::Denied {
            reason,
            remaining: 0,
            quota,
        }
    }

    #[inline]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    #[inline]
    pub fn remaining(&self) -> u32 {
        match *self {
            Self::Allowed { remaining, .. } | Self::Denied { remaining, .. } => remaining,
        }
    }

    /// The account's daily quota (0 when unknown).
    #[inline]
    pub fn quota(&self) -> u32 {
        match *self {
            Self::Allowed { quota, .. } | Self::Denied { quota, .. } => quota,
        }
    }

    #[inline]
    pub fn reason(&self) -> Option<DenyReason> {
        match *self {
            Self::Allowed { .. } => None,
            Self::Denied { reason, .. } => Some(reason),
        }
    }

    /// Message for the person at the download page.
    pub fn message(&self) -> String {
        match *self {
            Self::Allowed { remaining: 1, .. } => "1 download remaining today".to_string(),
            Self::Allowed { remaining, .. } => format!("{remaining} downloads remaining today"),
            Self::Denied { reason, quota, .. } => match reason {
                DenyReason::UnknownAccount => "Please sign in to download".to_string(),
                DenyReason::UnverifiedEmail => {
                    "Please verify your email address first".to_string()
                }
                DenyReason::QuotaExceeded => format!(
                    "Daily download limit reached. {quota} downloads available again tomorrow"
                ),
                DenyReason::StoreUnavailable => {
                    "Could not check your download limit. Please try again".to_string()
                }
            },
        }
    }
}

/// Proof that a download was durably recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub event_id: String,
    pub occurred_at: i64,
    /// Downloads left today after this one.
    pub remaining: u32,
    /// The ledger write committed but the account counter update did not.
    pub partial_write: bool,
}

/// A store failure that prevented recording.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordFailure {
    /// The account record could not be read for re-verification.
    #[error("account read failed: {0}")]
    AccountRead(String),
    /// The ledger write did not commit; no event exists.
    #[error("ledger write failed: {0}")]
    LedgerWrite(String),
}

impl RecordFailure {
    /// Stable code for logs, metrics and API payloads.
    pub fn code(&self) -> &'static str {
        ERROR_STORE_UNAVAILABLE
    }
}

/// Outcome of `record`. Only [`RecordResult::Success`] unlocks the asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordResult {
    Success(Receipt),
    /// Policy rejected the write at record time.
    Denied(DenyReason),
    Failure(RecordFailure),
}

impl RecordResult {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    #[inline]
    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            Self::Success(receipt) => Some(receipt),
            _ => None,
        }
    }
}
