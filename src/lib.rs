//! # henu-rs
//!
//! Download entitlement and community services for HENU OS.
//!
//! ## Crates
//!
//! - [`henu_core`] - Shared constants and database URL detection
//! - [`henu_entitlement`] - Accounts, download ledger, quotas and identity sync
//! - [`henu_apply`] - Team application intake and notifications
//! - [`henu_config`] - Configuration loading and validation
//! - [`henu_metrics`] - Prometheus-compatible metrics
//! - [`henu_server`] - HTTP API

pub use henu_apply as apply;
pub use henu_config as config;
pub use henu_core as core;
pub use henu_entitlement as entitlement;
pub use henu_metrics as metrics;
pub use henu_server as server;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use henu_config::{Config, load_config, validate_config};
    pub use henu_entitlement::{
        AccountStore, DownloadLedger, EntitlementEngine, IdentityProvider, IdentitySync,
        QuotaPolicy, RecordResult, Verdict,
    };
    pub use henu_server::{AppState, CancellationToken, ServerError, run, run_with_shutdown};
}
