//! Server-issued session tokens.
//!
//! A password sign-in has no provider token to present afterwards, so the
//! server hands out its own. The table is in memory and keyed by the SHA-224
//! digest of the token; a restart signs those sessions out.

use std::collections::HashMap;

use henu_entitlement::{Clock, Identity, digest_hex};
use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

use crate::state::SharedClock;

/// Token returned to the client, presented later as `Authorization: Bearer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    /// Unix seconds.
    pub expires_at: i64,
}

struct Entry {
    identity: Identity,
    expires_at: i64,
}

pub struct SessionTokens {
    clock: SharedClock,
    ttl_secs: i64,
    entries: RwLock<HashMap<String, Entry>>,
}

impl SessionTokens {
    pub fn new(clock: SharedClock, ttl_secs: u64) -> Self {
        Self {
            clock,
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn clock(&self) -> SharedClock {
        self.clock.clone()
    }

    /// Issue a fresh token for `identity`. Expired entries are dropped.
    pub fn issue(&self, identity: &Identity) -> IssuedToken {
        let now = self.clock.now_unix();
        let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let expires_at = now.saturating_add(self.ttl_secs);

        let mut entries = self.entries.write();
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            digest_hex(&token),
            Entry {
                identity: identity.clone(),
                expires_at,
            },
        );
        IssuedToken { token, expires_at }
    }

    /// The identity signed in under `token`, while it is unexpired.
    pub fn resolve(&self, token: &str) -> Option<Identity> {
        let now = self.clock.now_unix();
        self.entries
            .read()
            .get(&digest_hex(token))
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.identity.clone())
    }

    /// Forget one token. Returns whether it was known.
    pub fn revoke(&self, token: &str) -> bool {
        self.entries.write().remove(&digest_hex(token)).is_some()
    }

    /// Number of live and not yet pruned tokens.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("ttl_secs", &self.ttl_secs)
            .field("sessions", &self.len())
            .finish_non_exhaustive()
    }
}
