// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express. All failures are
//! collected so an operator sees every problem in one run.

use crate::diagnostic::ConfigError;
use crate::model::CasebookConfig;

/// Lower bound on the advertised poll period.
pub const MIN_POLL_INTERVAL_MS: u64 = 250;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &CasebookConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.service.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::invalid(
            "service.log_level",
            format!(
                "`{}` is not one of {}",
                config.service.log_level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::invalid("server.host", "must not be empty"));
    } else {
        let is_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_ip && !is_hostname {
            errors.push(ConfigError::invalid(
                "server.host",
                format!("`{host}` is not a valid IP address or hostname"),
            ));
        }
    }

    if config.server.port == 0 {
        errors.push(ConfigError::invalid("server.port", "must be greater than 0"));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::invalid(
            "storage.database_path",
            "must not be empty",
        ));
    }

    if config.smtp.enabled {
        if config.smtp.host.trim().is_empty() {
            errors.push(ConfigError::invalid(
                "smtp.host",
                "required when smtp.enabled = true",
            ));
        }
        if !config.smtp.from_address.contains('@') {
            errors.push(ConfigError::invalid(
                "smtp.from_address",
                "must be an email address when smtp.enabled = true",
            ));
        }
    }

    for (key, url) in [
        ("links.customer_base_url", &config.links.customer_base_url),
        ("links.backoffice_base_url", &config.links.backoffice_base_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::invalid(
                key,
                format!("`{url}` must start with http:// or https://"),
            ));
        }
    }

    if config.chat.poll_interval_ms < MIN_POLL_INTERVAL_MS {
        errors.push(ConfigError::invalid(
            "chat.poll_interval_ms",
            format!(
                "must be at least {MIN_POLL_INTERVAL_MS}, got {}",
                config.chat.poll_interval_ms
            ),
        ));
    }

    if config.session.idle_timeout_secs == 0 {
        errors.push(ConfigError::invalid(
            "session.idle_timeout_secs",
            "must be greater than 0",
        ));
    }

    if config.registration.min_password_length == 0 {
        errors.push(ConfigError::invalid(
            "registration.min_password_length",
            "must be at least 1",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
