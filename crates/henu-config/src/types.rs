//! Configuration type definitions for server, storage, quota, identity,
//! notifications, downloads, metrics, and logging.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address, e.g. 0.0.0.0:8080
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Seconds to wait for in-flight requests on shutdown.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Lifetime of session tokens issued on password sign-in.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
            max_body_bytes: default_max_body_bytes(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend: "memory" or "sql".
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    /// Database URL (required for "sql").
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_db_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_db_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Create tables on startup.
    #[serde(default = "default_true")]
    pub init_schema: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            database_url: None,
            max_connections: default_db_max_connections(),
            min_connections: default_db_min_connections(),
            connect_timeout_secs: default_db_connect_timeout_secs(),
            init_schema: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Downloads per day for standard accounts.
    #[serde(default = "default_standard_daily")]
    pub standard_daily: u32,
    /// Downloads per day for elevated accounts.
    #[serde(default = "default_elevated_daily")]
    pub elevated_daily: u32,
    /// Offset of the quota day from UTC in seconds (0 = UTC midnight).
    #[serde(default = "default_utc_offset_secs")]
    pub utc_offset_secs: i64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            standard_daily: default_standard_daily(),
            elevated_daily: default_elevated_daily(),
            utc_offset_secs: default_utc_offset_secs(),
        }
    }
}

/// A statically configured principal. Secrets are SHA-224 hex digests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticUserConfig {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub token_sha224: Option<String>,
    #[serde(default)]
    pub password_sha224: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Provider: "static" or "http".
    #[serde(default = "default_identity_provider")]
    pub provider: String,
    /// Users for the static provider.
    #[serde(default)]
    pub users: Vec<StaticUserConfig>,
    /// Base URL of the remote identity service (http provider).
    #[serde(default)]
    pub url: Option<String>,
    /// Bearer token presented to the identity service.
    #[serde(default)]
    pub node_token: Option<String>,
    #[serde(default = "default_identity_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            provider: default_identity_provider(),
            users: Vec::new(),
            url: None,
            node_token: None,
            timeout_secs: default_identity_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Provider: "log" or "emailjs".
    #[serde(default = "default_notify_provider")]
    pub provider: String,
    #[serde(default = "default_notify_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub template_id: String,
    /// EmailJS public key.
    #[serde(default)]
    pub public_key: String,
    /// EmailJS private key (access token), if the account requires it.
    #[serde(default)]
    pub private_key: Option<String>,
    /// Team inbox receiving applications.
    #[serde(default)]
    pub recipient: String,
    #[serde(default = "default_notify_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            provider: default_notify_provider(),
            endpoint: default_notify_endpoint(),
            service_id: String::new(),
            template_id: String::new(),
            public_key: String::new(),
            private_key: None,
            recipient: String::new(),
            timeout_secs: default_notify_timeout_secs(),
        }
    }
}

/// One place the installer image can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Short identifier clients select by, e.g. "github".
    pub name: String,
    /// Human-readable label.
    #[serde(default)]
    pub label: Option<String>,
    pub url: String,
    #[serde(default)]
    pub location: Option<String>,
    /// Used when the client does not pick a mirror.
    #[serde(default)]
    pub recommended: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadsConfig {
    /// Mirrors, in display order. At least one is required.
    #[serde(default)]
    pub mirrors: Vec<MirrorConfig>,
    /// Published checksums of the image, algorithm -> hex digest.
    #[serde(default)]
    pub checksums: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Prometheus exporter listen address. Disabled when unset.
    pub listen: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: Option<String>,
    /// Log format: json, pretty, or compact. Default: pretty.
    pub format: Option<String>,
    /// Output target: stdout or stderr. Default: stderr.
    pub output: Option<String>,
    /// Per-module log level filters (e.g., {"henu_entitlement": "debug", "sqlx": "warn"}).
    #[serde(default)]
    pub filters: HashMap<String, String>,
}
