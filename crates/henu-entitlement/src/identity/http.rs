//! HTTP identity provider.
//!
//! Delegates credential checks to a remote identity service.
//!
//! # Example
//!
//! ```no_run
//! use henu_entitlement::HttpIdentity;
//!
//! let identity = HttpIdentity::new("https://id.henu-os.org", Some("node-token".into()));
//! ```

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::broadcast;

use super::{Credentials, Identity, IdentityProvider, SessionEvent, SessionHub};
use crate::error::IdentityError;
use crate::record::Profile;

/// Identity provider backed by `POST {base}/verify`.
#[derive(Debug)]
pub struct HttpIdentity {
    client: Client,
    verify_url: String,
    node_token: Option<String>,
    hub: SessionHub,
}

impl HttpIdentity {
    /// Create a provider for `base_url`.
    ///
    /// `node_token` is sent as a Bearer token so the identity service can
    /// tell which deployment is asking.
    pub fn new(base_url: impl Into<String>, node_token: Option<String>) -> Self {
        Self::with_client(Client::new(), base_url, node_token)
    }

    /// Create with a custom reqwest [`Client`] (for timeouts, proxies, etc.).
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        node_token: Option<String>,
    ) -> Self {
        let base = base_url.into();
        let base = base.trim_end_matches('/');
        Self {
            client,
            verify_url: format!("{base}/verify"),
            node_token,
            hub: SessionHub::new(),
        }
    }

    /// The verification endpoint.
    pub fn verify_url(&self) -> &str {
        &self.verify_url
    }

    async fn verify(&self, body: &wire::VerifyRequest) -> Result<Identity, IdentityError> {
        let mut req = self.client.post(&self.verify_url);
        if let Some(ref token) = self.node_token {
            req = req.bearer_auth(token);
        }
        let resp = req.json(body).send().await.map_err(IdentityError::backend)?;

        if !resp.status().is_success() {
            return Err(IdentityError::Backend(format!(
                "HTTP {}",
                resp.status().as_u16()
            )));
        }

        let result: Result<wire::Identity, wire::IdentityError> =
            resp.json().await.map_err(IdentityError::backend)?;
        result.map(Into::into).map_err(Into::into)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentity {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, IdentityError> {
        let body = match credentials {
            Credentials::Token(token) if token.is_empty() => {
                return Err(IdentityError::MissingCredentials);
            }
            Credentials::Token(token) => wire::VerifyRequest::Token {
                token: token.clone(),
            },
            Credentials::Password { email, password } => wire::VerifyRequest::Password {
                email: email.clone(),
                password: password.clone(),
            },
        };
        let identity = self.verify(&body).await?;
        self.hub.signed_in(&identity);
        Ok(identity)
    }

    async fn sign_out(&self, user_id: &str) -> Result<(), IdentityError> {
        self.hub.signed_out(user_id);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.hub.subscribe()
    }
}

// ── Wire types (must match the identity service) ──────────────────

#[allow(missing_debug_implementations)]
mod wire {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum VerifyRequest {
        Token { token: String },
        Password { email: String, password: String },
    }

    #[derive(Serialize, Deserialize)]
    pub struct Identity {
        pub uid: String,
        pub email: String,
        #[serde(default)]
        pub email_verified: bool,
        #[serde(default)]
        pub display_name: Option<String>,
        #[serde(default)]
        pub photo_url: Option<String>,
    }

    #[derive(Serialize, Deserialize)]
    pub enum IdentityError {
        Rejected(String),
        Backend(String),
    }
}

// ── Wire ↔ core conversions ───────────────────────────────────────

impl From<wire::Identity> for Identity {
    fn from(w: wire::Identity) -> Self {
        Self {
            user_id: w.uid,
            profile: Profile {
                email: w.email,
                email_verified: w.email_verified,
                display_name: w.display_name,
                photo_url: w.photo_url,
            },
        }
    }
}

impl From<wire::IdentityError> for IdentityError {
    fn from(w: wire::IdentityError) -> Self {
        match w {
            wire::IdentityError::Rejected(msg) => Self::Rejected(msg),
            wire::IdentityError::Backend(msg) => Self::Backend(msg),
        }
    }
}
