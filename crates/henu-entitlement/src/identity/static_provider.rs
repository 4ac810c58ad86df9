//! Config-backed identity provider.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::{Credentials, Identity, IdentityProvider, SessionEvent, SessionHub};
use crate::error::IdentityError;
use crate::hash::digest_matches;
use crate::record::Profile;

/// One statically configured principal.
///
/// Secrets are stored as SHA-224 hex digests (see [`digest_hex`](crate::digest_hex)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticUser {
    pub user_id: String,
    #[serde(flatten)]
    pub profile: Profile,
    /// Digest of a bearer token that signs this user in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_sha224: Option<String>,
    /// Digest of the password for email sign-in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_sha224: Option<String>,
}

impl StaticUser {
    fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id.clone(),
            profile: self.profile.clone(),
        }
    }
}

/// In-memory identity provider.
#[derive(Debug)]
pub struct StaticIdentity {
    users: Vec<StaticUser>,
    /// token digest (lowercase) -> index into `users`
    by_token: HashMap<String, usize>,
    /// lowercase email -> index into `users`
    by_email: HashMap<String, usize>,
    hub: SessionHub,
}

impl StaticIdentity {
    /// Build a provider from a user table.
    pub fn new(users: Vec<StaticUser>) -> Self {
        let mut by_token = HashMap::new();
        let mut by_email = HashMap::new();
        for (idx, user) in users.iter().enumerate() {
            if let Some(digest) = &user.token_sha224 {
                by_token.insert(digest.to_ascii_lowercase(), idx);
            }
            if user.password_sha224.is_some() {
                by_email.insert(user.profile.email.to_ascii_lowercase(), idx);
            }
        }
        Self {
            users,
            by_token,
            by_email,
            hub: SessionHub::new(),
        }
    }

    /// Number of configured users.
    #[inline]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether no users are configured.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn lookup(&self, credentials: &Credentials) -> Result<&StaticUser, IdentityError> {
        match credentials {
            Credentials::Token(token) => {
                if token.is_empty() {
                    return Err(IdentityError::MissingCredentials);
                }
                self.by_token
                    .get(&crate::digest_hex(token))
                    .map(|&idx| &self.users[idx])
                    .ok_or_else(|| IdentityError::Rejected("Invalid or expired session".into()))
            }
            Credentials::Password { email, password } => {
                if email.is_empty() || password.is_empty() {
                    return Err(IdentityError::MissingCredentials);
                }
                let user = self
                    .by_email
                    .get(&email.trim().to_ascii_lowercase())
                    .map(|&idx| &self.users[idx]);
                match user {
                    Some(user)
                        if user
                            .password_sha224
                            .as_deref()
                            .is_some_and(|d| digest_matches(password, d)) =>
                    {
                        Ok(user)
                    }
                    _ => Err(IdentityError::Rejected("Invalid email or password".into())),
                }
            }
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, IdentityError> {
        let identity = self.lookup(credentials)?.identity();
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest_hex;

    fn provider() -> StaticIdentity {
        StaticIdentity::new(vec![
            StaticUser {
                user_id: "u1".into(),
                profile: Profile {
                    email: "Ada@Example.org".into(),
                    email_verified: true,
                    display_name: Some("Ada".into()),
                    photo_url: None,
                },
                token_sha224: Some(digest_hex("tok-1").to_uppercase()),
                password_sha224: Some(digest_hex("pw-1")),
            },
            StaticUser {
                user_id: "u2".into(),
                profile: Profile {
                    email: "bob@example.org".into(),
                    ..Profile::default()
                },
                token_sha224: Some(digest_hex("tok-2")),
                password_sha224: None,
            },
        ])
    }

    #[tokio::test]
    async fn test_token_sign_in() {
        let provider = provider();
        let identity = provider
            .authenticate(&Credentials::Token("tok-1".into()))
            .await
            .unwrap();
        assert_eq!(identity.user_id, "u1");
        assert_eq!(identity.profile.display_name.as_deref(), Some("Ada"));
        assert!(identity.profile.email_verified);
    }

    #[tokio::test]
    async fn test_password_sign_in_ignores_email_case() {
        let provider = provider();
        let identity = provider
            .authenticate(&Credentials::Password {
                email: " ada@example.ORG".into(),
                password: "pw-1".into(),
            })
            .await
            .unwrap();
        assert_eq!(identity.user_id, "u1");
    }

    #[tokio::test]
    async fn test_rejections_carry_user_message() {
        let provider = provider();

        let err = provider
            .authenticate(&Credentials::Token("nope".into()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid or expired session");

        let err = provider
            .authenticate(&Credentials::Password {
                email: "ada@example.org".into(),
                password: "wrong".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");

        // No password configured for u2.
        let err = provider
            .authenticate(&Credentials::Password {
                email: "bob@example.org".into(),
                password: "anything".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::Rejected(_)));

        let err = provider
            .authenticate(&Credentials::Token(String::new()))
            .await
            .unwrap_err();
        assert_eq!(err, IdentityError::MissingCredentials);
    }

    #[tokio::test]
    async fn test_session_events() {
        let provider = provider();
        let mut rx = provider.subscribe();

        provider
            .authenticate(&Credentials::Token("tok-2".into()))
            .await
            .unwrap();
        provider.sign_out("u2").await.unwrap();

        match rx.recv().await.unwrap() {
            SessionEvent::SignedIn(identity) => assert_eq!(identity.user_id, "u2"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            rx.recv().await.unwrap(),
            SessionEvent::SignedOut {
                user_id: "u2".into()
            }
        );
    }

    #[test]
    fn test_deserialize_user_table() {
        let json = r#"[{
            "user_id": "u9",
            "email": "nine@example.org",
            "email_verified": true,
            "token_sha224": "abc"
        }]"#;
        let users: Vec<StaticUser> = serde_json::from_str(json).unwrap();
        assert_eq!(users[0].profile.email, "nine@example.org");
        assert!(users[0].password_sha224.is_none());
        assert_eq!(StaticIdentity::new(users).len(), 1);
    }
}
