//! Outbound notification boundary.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::NotifyError;

/// Template variables, name -> value.
pub type TemplateVars = BTreeMap<String, String>;

/// Sends a templated message to a fixed recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, template_id: &str, vars: &TemplateVars) -> Result<(), NotifyError>;
}

#[async_trait]
impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    #[inline]
    async fn send(&self, template_id: &str, vars: &TemplateVars) -> Result<(), NotifyError> {
        (**self).send(template_id, vars).await
    }
}

/// Notifier that only logs. Used when no email service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, template_id: &str, vars: &TemplateVars) -> Result<(), NotifyError> {
        info!(template_id, vars = vars.len(), "notification (log only)");
        Ok(())
    }
}

/// EmailJS-compatible REST notifier.
///
/// # Example
///
/// ```no_run
/// use henu_apply::EmailJsNotifier;
///
/// let notifier = EmailJsNotifier::new(
///     "https://api.emailjs.com/api/v1.0/email/send",
///     "service_henu",
///     "public-key",
///     None,
/// );
/// ```
#[derive(Debug, Clone)]
pub struct EmailJsNotifier {
    client: Client,
    endpoint: String,
    service_id: String,
    public_key: String,
    private_key: Option<String>,
}

impl EmailJsNotifier {
    pub fn new(
        endpoint: impl Into<String>,
        service_id: impl Into<String>,
        public_key: impl Into<String>,
        private_key: Option<String>,
    ) -> Self {
        Self::with_client(Client::new(), endpoint, service_id, public_key, private_key)
    }

    /// Create with a custom reqwest [`Client`] (for timeouts, proxies, etc.).
    pub fn with_client(
        client: Client,
        endpoint: impl Into<String>,
        service_id: impl Into<String>,
        public_key: impl Into<String>,
        private_key: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            service_id: service_id.into(),
            public_key: public_key.into(),
            private_key,
        }
    }

    fn payload<'a>(&'a self, template_id: &'a str, vars: &'a TemplateVars) -> SendRequest<'a> {
        SendRequest {
            service_id: &self.service_id,
            template_id,
            user_id: &self.public_key,
            access_token: self.private_key.as_deref(),
            template_params: vars,
        }
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    template_params: &'a TemplateVars,
}

#[async_trait]
impl Notifier for EmailJsNotifier {
    async fn send(&self, template_id: &str, vars: &TemplateVars) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&self.payload(template_id, vars))
            .send()
            .await
            .map_err(NotifyError::transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        debug!(template_id, "notification sent");
        Ok(())
    }
}
