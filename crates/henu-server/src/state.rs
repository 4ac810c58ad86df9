//! Shared handler state and its construction from [`Config`].

use std::sync::Arc;
use std::time::Duration;

use henu_apply::{
    ApplicationIntake, ApplicationStore, EmailJsNotifier, LogNotifier, MemoryApplications,
    Notifier, SqlApplications,
};
use henu_config::{Config, DownloadsConfig, IdentityConfig, NotifyConfig, StorageConfig};
use henu_entitlement::sql::{SqlStore, SqlStoreConfig};
use henu_entitlement::{
    AccountStore, Clock, DownloadLedger, EntitlementEngine, HttpIdentity, IdentityProvider,
    IdentitySync, MemoryStore, Profile, QuotaPolicy, StaticIdentity, StaticUser, SystemClock,
};
use tracing::info;

use crate::error::ServerError;
use crate::sessions::SessionTokens;

pub type SharedAccounts = Arc<dyn AccountStore>;
pub type SharedLedger = Arc<dyn DownloadLedger>;
pub type SharedClock = Arc<dyn Clock>;
pub type Engine = EntitlementEngine<SharedAccounts, SharedLedger, SharedClock>;
pub type AccountSync = IdentitySync<SharedAccounts, SharedClock>;
pub type Intake = ApplicationIntake<Arc<dyn ApplicationStore>, Arc<dyn Notifier>, SharedClock>;

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub engine: Arc<Engine>,
    pub sync: Arc<AccountSync>,
    pub intake: Arc<Intake>,
    pub sessions: Arc<SessionTokens>,
    pub downloads: Arc<DownloadsConfig>,
}

/// Storage handles opened from `[storage]`.
pub struct Stores {
    pub accounts: SharedAccounts,
    pub ledger: SharedLedger,
    pub applications: Arc<dyn ApplicationStore>,
}

impl AppState {
    /// Assemble state from already-built parts.
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        stores: Stores,
        notifier: Arc<dyn Notifier>,
        notify: &NotifyConfig,
        downloads: DownloadsConfig,
        policy: QuotaPolicy,
        clock: SharedClock,
    ) -> Self {
        let engine = EntitlementEngine::with_clock(
            stores.accounts.clone(),
            stores.ledger,
            clock.clone(),
            policy,
        );
        let sync = IdentitySync::with_clock(stores.accounts, clock.clone());
        let sessions = SessionTokens::new(clock.clone(), henu_core::DEFAULT_SESSION_TTL_SECS);
        let intake = ApplicationIntake::with_clock(
            stores.applications,
            notifier,
            clock,
            notify.template_id.clone(),
            notify.recipient.clone(),
        );
        Self {
            identity,
            engine: Arc::new(engine),
            sync: Arc::new(sync),
            intake: Arc::new(intake),
            sessions: Arc::new(sessions),
            downloads: Arc::new(downloads),
        }
    }

    /// Replace the session table with an empty one using `ttl_secs`.
    pub fn with_session_ttl(mut self, ttl_secs: u64) -> Self {
        self.sessions = Arc::new(SessionTokens::new(self.sessions.clock(), ttl_secs));
        self
    }

    /// Build every backend named in a validated config.
    pub async fn from_config(config: &Config) -> Result<Self, ServerError> {
        let stores = open_stores(&config.storage).await?;
        let identity = build_identity(&config.identity)?;
        let notifier = build_notifier(&config.notify)?;
        let policy = QuotaPolicy {
            standard: config.quota.standard_daily,
            elevated: config.quota.elevated_daily,
            utc_offset_secs: config.quota.utc_offset_secs,
        };
        info!(
            standard = policy.standard,
            elevated = policy.elevated,
            utc_offset_secs = policy.utc_offset_secs,
            "download quotas configured"
        );
        Ok(Self::new(
            identity,
            stores,
            notifier,
            &config.notify,
            config.downloads.clone(),
            policy,
            Arc::new(SystemClock),
        )
        .with_session_ttl(config.server.session_ttl_secs))
    }
}

/// Open the account store, download ledger and application store.
pub async fn open_stores(config: &StorageConfig) -> Result<Stores, ServerError> {
    match config.backend.as_str() {
        "memory" => {
            info!("using in-memory storage; data is lost on restart");
            let store = Arc::new(MemoryStore::new());
            Ok(Stores {
                accounts: store.clone(),
                ledger: store,
                applications: Arc::new(MemoryApplications::new()),
            })
        }
        "sql" => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| ServerError::Config("storage.database_url is not set".into()))?;
            let sql_config = SqlStoreConfig::new(url)
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
                .init_schema(config.init_schema);
            let store = SqlStore::connect(sql_config).await?;

            let applications = SqlApplications::new(store.pool().clone(), store.database_type());
            if config.init_schema {
                applications.init_schema().await?;
            }

            let store = Arc::new(store);
            Ok(Stores {
                accounts: store.clone(),
                ledger: store,
                applications: Arc::new(applications),
            })
        }
        other => Err(ServerError::Config(format!(
            "unknown storage backend {other:?}"
        ))),
    }
}

fn build_identity(config: &IdentityConfig) -> Result<Arc<dyn IdentityProvider>, ServerError> {
    match config.provider.as_str() {
        "static" => {
            let users = config
                .users
                .iter()
                .map(|u| StaticUser {
                    user_id: u.user_id.clone(),
                    profile: Profile {
                        email: u.email.clone(),
                        email_verified: u.email_verified,
                        display_name: u.display_name.clone(),
                        photo_url: u.photo_url.clone(),
                    },
                    token_sha224: u.token_sha224.clone(),
                    password_sha224: u.password_sha224.clone(),
                })
                .collect::<Vec<_>>();
            info!(users = users.len(), "static identity provider");
            Ok(Arc::new(StaticIdentity::new(users)))
        }
        "http" => {
            let url = config
                .url
                .as_deref()
                .ok_or_else(|| ServerError::Config("identity.url is not set".into()))?;
            let client = http_client(config.timeout_secs)?;
            let provider = HttpIdentity::with_client(client, url, config.node_token.clone());
            info!(url = provider.verify_url(), "remote identity provider");
            Ok(Arc::new(provider))
        }
        other => Err(ServerError::Config(format!(
            "unknown identity provider {other:?}"
        ))),
    }
}

fn build_notifier(config: &NotifyConfig) -> Result<Arc<dyn Notifier>, ServerError> {
    match config.provider.as_str() {
        "log" => Ok(Arc::new(LogNotifier)),
        "emailjs" => {
            let client = http_client(config.timeout_secs)?;
            Ok(Arc::new(EmailJsNotifier::with_client(
                client,
                config.endpoint.clone(),
                config.service_id.clone(),
                config.public_key.clone(),
                config.private_key.clone(),
            )))
        }
        other => Err(ServerError::Config(format!(
            "unknown notify provider {other:?}"
        ))),
    }
}

fn http_client(timeout_secs: u64) -> Result<reqwest::Client, ServerError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("henu-rs/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ServerError::Config(format!("http client: {e}")))
}
