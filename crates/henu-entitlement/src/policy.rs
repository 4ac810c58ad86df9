//! Daily quota policy.

use henu_core::{
    DEFAULT_ELEVATED_DAILY_QUOTA, DEFAULT_QUOTA_UTC_OFFSET_SECS, DEFAULT_STANDARD_DAILY_QUOTA,
    SECS_PER_DAY,
};

use crate::record::Tier;

/// Per-tier daily quotas and the reference zone for the day boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    /// Downloads per day for [`Tier::Standard`].
    pub standard: u32,
    /// Downloads per day for [`Tier::Elevated`].
    pub elevated: u32,
    /// Offset of the reference zone from UTC in seconds. 0 = UTC midnight.
    pub utc_offset_secs: i64,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            standard: DEFAULT_STANDARD_DAILY_QUOTA,
            elevated: DEFAULT_ELEVATED_DAILY_QUOTA,
            utc_offset_secs: DEFAULT_QUOTA_UTC_OFFSET_SECS,
        }
    }
}

impl QuotaPolicy {
    /// Daily quota for a tier.
    #[inline]
    pub fn quota_for(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Standard => self.standard,
            Tier::Elevated => self.elevated,
        }
    }

    /// Unix time of the most recent day boundary at or before `now`.
    #[inline]
    pub fn start_of_day(&self, now: i64) -> i64 {
        now - (now + self.utc_offset_secs).rem_euclid(SECS_PER_DAY)
    }

    /// Unix time of the next day boundary after `now`.
    #[inline]
    pub fn next_reset(&self, now: i64) -> i64 {
        self.start_of_day(now) + SECS_PER_DAY
    }
}
