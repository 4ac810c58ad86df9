//! Account records and download events.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EntitlementError;

/// Account classification controlling the daily quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Default tier for every new account.
    #[default]
    Standard,
    /// Raised quota.
    Elevated,
}

impl Tier {
    /// Stable lowercase name, as stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Elevated => "elevated",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = EntitlementError;

    /// Accepts `standard`/`elevated` and the legacy role names `free`/`premium`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "free" => Ok(Self::Standard),
            "elevated" | "premium" => Ok(Self::Elevated),
            other => Err(EntitlementError::InvalidTier(other.to_string())),
        }
    }
}

/// Mutable fields copied from the identity provider on every sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Profile {
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// One record per authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Stable identifier issued by the identity provider.
    pub user_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub tier: Tier,
    pub email_verified: bool,
    /// Informational. Quota decisions count the ledger instead.
    pub lifetime_download_count: u64,
    pub last_download_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl AccountRecord {
    /// Fresh standard-tier record with a zero counter.
    pub fn new(user_id: impl Into<String>, profile: &Profile, now: i64) -> Self {
        Self {
            user_id: user_id.into(),
            email: profile.email.clone(),
            display_name: profile.display_name.clone(),
            photo_url: profile.photo_url.clone(),
            tier: Tier::Standard,
            email_verified: profile.email_verified,
            lifetime_download_count: 0,
            last_download_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder: set the tier.
    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    /// Overwrite the provider-owned fields, leaving tier and counters alone.
    pub fn apply_profile(&mut self, profile: &Profile, now: i64) {
        self.email = profile.email.clone();
        self.display_name = profile.display_name.clone();
        self.photo_url = profile.photo_url.clone();
        self.email_verified = profile.email_verified;
        self.updated_at = now;
    }
}

/// Informational request metadata attached to a download event.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// One granted download. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadEvent {
    pub event_id: String,
    pub user_id: String,
    /// Server time of the write, Unix seconds.
    pub occurred_at: i64,
    #[serde(default)]
    pub context: ClientContext,
}

impl DownloadEvent {
    /// Create an event with a fresh random id.
    pub fn new(user_id: impl Into<String>, occurred_at: i64, context: ClientContext) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            occurred_at,
            context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(verified: bool) -> Profile {
        Profile {
            email: "ada@example.org".into(),
            email_verified: verified,
            display_name: Some("Ada".into()),
            photo_url: None,
        }
    }

    #[test]
    fn test_tier_parse() {
        assert_eq!("standard".parse::<Tier>().unwrap(), Tier::Standard);
        assert_eq!("Premium".parse::<Tier>().unwrap(), Tier::Elevated);
        assert_eq!(" free ".parse::<Tier>().unwrap(), Tier::Standard);
        assert!(matches!(
            "gold".parse::<Tier>(),
            Err(EntitlementError::InvalidTier(t)) if t == "gold"
        ));
    }

    #[test]
    fn test_tier_serde() {
        assert_eq!(serde_json::to_string(&Tier::Elevated).unwrap(), "\"elevated\"");
        let tier: Tier = serde_json::from_str("\"standard\"").unwrap();
        assert_eq!(tier, Tier::Standard);
    }

    #[test]
    fn test_new_account_defaults() {
        let record = AccountRecord::new("u1", &profile(true), 42);
        assert_eq!(record.tier, Tier::Standard);
        assert_eq!(record.lifetime_download_count, 0);
        assert_eq!(record.last_download_at, None);
        assert_eq!(record.created_at, 42);
        assert!(record.email_verified);
    }

    #[test]
    fn test_apply_profile_keeps_tier_and_counters() {
        let mut record = AccountRecord::new("u1", &profile(false), 1).with_tier(Tier::Elevated);
        record.lifetime_download_count = 7;
        record.last_download_at = Some(5);

        let updated = Profile {
            email: "ada@henu.dev".into(),
            ..profile(true)
        };
        record.apply_profile(&updated, 9);

        assert_eq!(record.email, "ada@henu.dev");
        assert!(record.email_verified);
        assert_eq!(record.tier, Tier::Elevated);
        assert_eq!(record.lifetime_download_count, 7);
        assert_eq!(record.last_download_at, Some(5));
        assert_eq!(record.created_at, 1);
        assert_eq!(record.updated_at, 9);
    }

    #[test]
    fn test_event_ids_are_unique() {
        let a = DownloadEvent::new("u1", 1, ClientContext::default());
        let b = DownloadEvent::new("u1", 1, ClientContext::default());
        assert_ne!(a.event_id, b.event_id);
    }
}
