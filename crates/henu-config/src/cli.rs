//! CLI override definitions and application logic.

use clap::Parser;

use crate::Config;

#[derive(Debug, Clone, Parser, Default)]
pub struct CliOverrides {
    /// Override HTTP listen address, e.g. 0.0.0.0:8080
    #[arg(long)]
    pub listen: Option<String>,
    /// Override storage backend (memory | sql)
    #[arg(long)]
    pub storage_backend: Option<String>,
    /// Override database URL (implies --storage-backend sql)
    #[arg(long)]
    pub database_url: Option<String>,
    /// Override standard daily download quota
    #[arg(long)]
    pub standard_quota: Option<u32>,
    /// Override elevated daily download quota
    #[arg(long)]
    pub elevated_quota: Option<u32>,
    /// Override quota day offset from UTC (seconds)
    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset_secs: Option<i64>,
    /// Override metrics listen address
    #[arg(long)]
    pub metrics_listen: Option<String>,
    /// Override log level (trace/debug/info/warn/error)
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) {
    if let Some(v) = &overrides.listen {
        config.server.listen = v.clone();
    }
    if let Some(v) = &overrides.database_url {
        config.storage.database_url = Some(v.clone());
        config.storage.backend = "sql".into();
    }
    if let Some(v) = &overrides.storage_backend {
        config.storage.backend = v.clone();
    }
    if let Some(v) = overrides.standard_quota {
        config.quota.standard_daily = v;
    }
    if let Some(v) = overrides.elevated_quota {
        config.quota.elevated_daily = v;
    }
    if let Some(v) = overrides.utc_offset_secs {
        config.quota.utc_offset_secs = v;
    }
    if let Some(v) = &overrides.metrics_listen {
        config.metrics.listen = Some(v.clone());
    }
    if let Some(v) = &overrides.log_level {
        config.logging.level = Some(v.clone());
    }
}
