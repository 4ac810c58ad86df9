//! Configuration validation logic.

use std::collections::HashSet;

use crate::Config;
use crate::loader::ConfigError;

const LOG_FORMATS: [&str; 3] = ["json", "pretty", "compact"];
const LOG_OUTPUTS: [&str; 2] = ["stdout", "stderr"];

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.listen.trim().is_empty() {
        return Err(ConfigError::Validation("server.listen is empty".into()));
    }
    if config.server.max_body_bytes == 0 {
        return Err(ConfigError::Validation(
            "server.max_body_bytes must be > 0".into(),
        ));
    }
    if config.server.session_ttl_secs == 0 {
        return Err(ConfigError::Validation(
            "server.session_ttl_secs must be > 0".into(),
        ));
    }

    match config.storage.backend.as_str() {
        "memory" => {}
        "sql" => {
            let url = config.storage.database_url.as_deref().unwrap_or("");
            if url.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "storage.database_url is required for the sql backend".into(),
                ));
            }
            if henu_core::DatabaseType::from_url(url).is_none() {
                return Err(ConfigError::Validation(
                    "storage.database_url must start with postgres://, mysql:// or sqlite:".into(),
                ));
            }
            if config.storage.max_connections == 0 {
                return Err(ConfigError::Validation(
                    "storage.max_connections must be > 0".into(),
                ));
            }
            if config.storage.min_connections > config.storage.max_connections {
                return Err(ConfigError::Validation(
                    "storage.min_connections must be <= max_connections".into(),
                ));
            }
        }
        other => {
            return Err(ConfigError::Validation(format!(
                "storage.backend must be memory or sql, got {other:?}"
            )));
        }
    }

    if config.quota.standard_daily == 0 || config.quota.elevated_daily == 0 {
        return Err(ConfigError::Validation(
            "quota.standard_daily and quota.elevated_daily must be > 0".into(),
        ));
    }
    if config.quota.elevated_daily < config.quota.standard_daily {
        return Err(ConfigError::Validation(
            "quota.elevated_daily must be >= quota.standard_daily".into(),
        ));
    }
    if config.quota.utc_offset_secs.abs() >= henu_core::SECS_PER_DAY {
        return Err(ConfigError::Validation(
            "quota.utc_offset_secs must be within one day of UTC".into(),
        ));
    }

    match config.identity.provider.as_str() {
        "static" => {
            if config.identity.users.is_empty() {
                return Err(ConfigError::Validation(
                    "identity.users must be non-empty for the static provider".into(),
                ));
            }
            let mut seen = HashSet::new();
            for user in &config.identity.users {
                if user.user_id.trim().is_empty() {
                    return Err(ConfigError::Validation("identity.users: empty user_id".into()));
                }
                if !seen.insert(user.user_id.as_str()) {
                    return Err(ConfigError::Validation(format!(
                        "identity.users: duplicate user_id {:?}",
                        user.user_id
                    )));
                }
                if user.token_sha224.is_none() && user.password_sha224.is_none() {
                    return Err(ConfigError::Validation(format!(
                        "identity.users: {:?} needs token_sha224 or password_sha224",
                        user.user_id
                    )));
                }
                for digest in [&user.token_sha224, &user.password_sha224].into_iter().flatten() {
                    if digest.len() != 56 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                        return Err(ConfigError::Validation(format!(
                            "identity.users: {:?} has a malformed SHA-224 digest",
                            user.user_id
                        )));
                    }
                }
            }
        }
        "http" => {
            if config.identity.url.as_deref().unwrap_or("").trim().is_empty() {
                return Err(ConfigError::Validation(
                    "identity.url is required for the http provider".into(),
                ));
            }
        }
        other => {
            return Err(ConfigError::Validation(format!(
                "identity.provider must be static or http, got {other:?}"
            )));
        }
    }

    match config.notify.provider.as_str() {
        "log" => {}
        "emailjs" => {
            for (name, value) in [
                ("notify.service_id", &config.notify.service_id),
                ("notify.template_id", &config.notify.template_id),
                ("notify.public_key", &config.notify.public_key),
                ("notify.recipient", &config.notify.recipient),
                ("notify.endpoint", &config.notify.endpoint),
            ] {
                if value.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "{name} is required for the emailjs provider"
                    )));
                }
            }
        }
        other => {
            return Err(ConfigError::Validation(format!(
                "notify.provider must be log or emailjs, got {other:?}"
            )));
        }
    }

    if config.downloads.mirrors.is_empty() {
        return Err(ConfigError::Validation(
            "downloads.mirrors must contain at least one mirror".into(),
        ));
    }
    let mut names = HashSet::new();
    for mirror in &config.downloads.mirrors {
        if mirror.name.trim().is_empty() || mirror.url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "downloads.mirrors: name and url are required".into(),
            ));
        }
        if !names.insert(mirror.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "downloads.mirrors: duplicate name {:?}",
                mirror.name
            )));
        }
    }

    if let Some(format) = &config.logging.format {
        if !LOG_FORMATS.contains(&format.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.format must be one of: {LOG_FORMATS:?}"
            )));
        }
    }
    if let Some(output) = &config.logging.output {
        if !LOG_OUTPUTS.contains(&output.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.output must be one of: {LOG_OUTPUTS:?}"
            )));
        }
    }
    Ok(())
}
