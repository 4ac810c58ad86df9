//! Default value functions for serde deserialization.
//!
//! These functions forward to constants defined in `henu_core::defaults`.

use henu_core::defaults;

/// Generate default value functions that forward to henu_core::defaults constants.
macro_rules! default_fns {
    ($($fn_name:ident => $const_name:ident : $ty:ty),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> $ty {
                defaults::$const_name
            }
        )*
    };
}

/// Generate default value functions that return String from &str constants.
macro_rules! default_string_fns {
    ($($fn_name:ident => $const_name:ident),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> String {
                defaults::$const_name.to_string()
            }
        )*
    };
}

default_fns! {
    default_shutdown_timeout_secs   => DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64,
    default_max_body_bytes          => DEFAULT_MAX_BODY_BYTES: usize,
    default_session_ttl_secs        => DEFAULT_SESSION_TTL_SECS: u64,
    default_db_max_connections      => DEFAULT_DB_MAX_CONNECTIONS: u32,
    default_db_min_connections      => DEFAULT_DB_MIN_CONNECTIONS: u32,
    default_db_connect_timeout_secs => DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64,
    default_standard_daily          => DEFAULT_STANDARD_DAILY_QUOTA: u32,
    default_elevated_daily          => DEFAULT_ELEVATED_DAILY_QUOTA: u32,
    default_utc_offset_secs         => DEFAULT_QUOTA_UTC_OFFSET_SECS: i64,
    default_identity_timeout_secs   => DEFAULT_IDENTITY_TIMEOUT_SECS: u64,
    default_notify_timeout_secs     => DEFAULT_NOTIFY_TIMEOUT_SECS: u64,
}

default_string_fns! {
    default_listen          => DEFAULT_LISTEN,
    default_notify_endpoint => DEFAULT_NOTIFY_ENDPOINT,
}

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_storage_backend() -> String {
    "memory".to_string()
}

pub(crate) fn default_identity_provider() -> String {
    "static".to_string()
}

pub(crate) fn default_notify_provider() -> String {
    "log".to_string()
}
