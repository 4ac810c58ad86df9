//! Validate, store, notify.

use henu_core::{Clock, SystemClock};
use serde::Serialize;
use tracing::{info, warn};

use crate::application::TeamApplication;
use crate::error::ApplyError;
use crate::notify::{Notifier, TemplateVars};
use crate::store::ApplicationStore;

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    pub id: String,
    /// Whether the team was notified. The application is kept either way.
    pub notified: bool,
}

/// Team application intake pipeline.
#[derive(Debug)]
pub struct ApplicationIntake<S, N, C = SystemClock> {
    store: S,
    notifier: N,
    clock: C,
    template_id: String,
    recipient: String,
}

impl<S: ApplicationStore, N: Notifier> ApplicationIntake<S, N, SystemClock> {
    /// `recipient` is the team inbox that receives each application.
    pub fn new(
        store: S,
        notifier: N,
        template_id: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self::with_clock(store, notifier, SystemClock, template_id, recipient)
    }
}

impl<S: ApplicationStore, N: Notifier, C: Clock> ApplicationIntake<S, N, C> {
    /// Create an intake that timestamps submissions from `clock`.
    pub fn with_clock(
        store: S,
        notifier: N,
        clock: C,
        template_id: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            template_id: template_id.into(),
            recipient: recipient.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Submit at the current server time.
    pub async fn submit(&self, application: &TeamApplication) -> Result<SubmitOutcome, ApplyError> {
        self.submit_at(application, self.clock.now_unix()).await
    }

    /// Submit with an explicit timestamp.
    pub async fn submit_at(
        &self,
        application: &TeamApplication,
        submitted_at: i64,
    ) -> Result<SubmitOutcome, ApplyError> {
        application.validate().map_err(ApplyError::Validation)?;

        let id = self.store.save(application, submitted_at).await?;
        info!(application_id = %id, "team application stored");

        let vars = self.template_vars(application, submitted_at);
        let notified = match self.notifier.send(&self.template_id, &vars).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    application_id = %id,
                    error = %e,
                    kind = henu_core::ERROR_NOTIFY,
                    "application notification failed; application kept"
                );
                false
            }
        };

        Ok(SubmitOutcome { id, notified })
    }

    fn template_vars(&self, app: &TeamApplication, submitted_at: i64) -> TemplateVars {
        let skills = app.skills_joined();
        let message = format!(
            "New application for the HENU OS team\n\n\
             Name: {}\nEmail: {}\nPhone: {}\nAddress: {}\n\n\
             Skills: {}\n\nPhoto: {}\nResume: {}\n\nSubmitted at (Unix): {}\n",
            app.name, app.email, app.phone, app.address, skills, app.photo_url, app.resume_url,
            submitted_at
        );

        [
            ("to_email", self.recipient.clone()),
            ("from_name", app.name.clone()),
            ("from_email", app.email.clone()),
            ("reply_to", app.email.clone()),
            ("phone", app.phone.clone()),
            ("address", app.address.clone()),
            ("skills", skills),
            ("photo_url", app.photo_url.clone()),
            ("resume_url", app.resume_url.clone()),
            ("message", message),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}
