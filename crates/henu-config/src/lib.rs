//! Configuration loading, validation and CLI overrides for the HENU OS
//! download service.
//!
//! A config file is JSON (comments allowed), YAML or TOML. Every section is
//! optional; missing values fall back to `henu_core::defaults`.

use serde::{Deserialize, Serialize};

mod cli;
mod defaults;
mod loader;
mod types;
mod validate;

pub use cli::{CliOverrides, apply_overrides};
pub use loader::{ConfigError, Format, ParseError, load_config};
pub use types::*;
pub use validate::validate_config;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub downloads: DownloadsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DownloadsConfig {
    /// Mirror by name, or the recommended one (first when none is flagged).
    pub fn mirror(&self, name: Option<&str>) -> Option<&MirrorConfig> {
        match name {
            Some(name) => self.mirrors.iter().find(|m| m.name == name),
            None => self
                .mirrors
                .iter()
                .find(|m| m.recommended)
                .or_else(|| self.mirrors.first()),
        }
    }
}
