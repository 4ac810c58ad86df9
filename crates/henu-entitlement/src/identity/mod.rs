//! Identity provider boundary.
//!
//! A provider turns [`Credentials`] into an [`Identity`] and announces
//! sign-in/sign-out transitions on a broadcast channel. Error messages
//! from the provider are surfaced to the user verbatim.

mod http;
mod static_provider;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::IdentityError;
use crate::record::Profile;

pub use http::HttpIdentity;
pub use static_provider::{StaticIdentity, StaticUser};

/// Capacity of each provider's session event channel.
pub const SESSION_CHANNEL_CAPACITY: usize = 256;

/// Authenticated principal as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    #[serde(flatten)]
    pub profile: Profile,
}

impl Identity {
    /// Create an identity with a bare profile.
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, email_verified: bool) -> Self {
        Self {
            user_id: user_id.into(),
            profile: Profile {
                email: email.into(),
                email_verified,
                ..Profile::default()
            },
        }
    }
}

/// What a client presents to sign in.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Opaque session or API token.
    Token(String),
    /// Email and password.
    Password { email: String, password: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Token(..)"),
            Self::Password { email, .. } => f
                .debug_struct("Password")
                .field("email", email)
                .finish_non_exhaustive(),
        }
    }
}

/// Auth state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(Identity),
    SignedOut { user_id: String },
}

/// Identity provider trait.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify credentials and return the principal.
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, IdentityError>;

    /// End the session for `user_id`. Emits [`SessionEvent::SignedOut`]
    /// if a session was active.
    async fn sign_out(&self, user_id: &str) -> Result<(), IdentityError>;

    /// Receive future session events.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}

#[async_trait]
impl<P: IdentityProvider + ?Sized> IdentityProvider for Arc<P> {
    #[inline]
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, IdentityError> {
        (**self).authenticate(credentials).await
    }

    #[inline]
    async fn sign_out(&self, user_id: &str) -> Result<(), IdentityError> {
        (**self).sign_out(user_id).await
    }

    #[inline]
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        (**self).subscribe()
    }
}

/// Session bookkeeping shared by the bundled providers.
///
/// Only transitions are broadcast: repeated authentication of an already
/// signed-in user does not emit another `SignedIn`, unless the profile
/// changed since the last one.
#[derive(Debug)]
pub(crate) struct SessionHub {
    tx: broadcast::Sender<SessionEvent>,
    active: Mutex<HashSet<(String, bool)>>,
}

impl SessionHub {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(SESSION_CHANNEL_CAPACITY);
        Self {
            tx,
            active: Mutex::new(HashSet::new()),
        }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub(crate) fn signed_in(&self, identity: &Identity) {
        let key = (identity.user_id.clone(), identity.profile.email_verified);
        let fresh = {
            let mut active = self.active.lock();
            // A change in verification state counts as a new sign-in.
            active.remove(&(key.0.clone(), !key.1));
            active.insert(key)
        };
        if fresh {
            debug!(user_id = %identity.user_id, "session started");
            // No receivers is fine.
            let _ = self.tx.send(SessionEvent::SignedIn(identity.clone()));
        }
    }

    pub(crate) fn signed_out(&self, user_id: &str) {
        let removed = {
            let mut active = self.active.lock();
            let a = active.remove(&(user_id.to_string(), true));
            let b = active.remove(&(user_id.to_string(), false));
            a || b
        };
        if removed {
            debug!(user_id, "session ended");
            let _ = self.tx.send(SessionEvent::SignedOut {
                user_id: user_id.to_string(),
            });
        }
    }
}
