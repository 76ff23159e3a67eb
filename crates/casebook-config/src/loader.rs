// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./casebook.toml` > `~/.config/casebook/casebook.toml` >
//! `/etc/casebook/casebook.toml` with environment variable overrides via `CASEBOOK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CasebookConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/casebook/casebook.toml";

/// Local config file, relative to the working directory.
pub const LOCAL_CONFIG_FILE: &str = "casebook.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/casebook/casebook.toml` (system-wide)
/// 3. `~/.config/casebook/casebook.toml` (user XDG config)
/// 4. `./casebook.toml` (local directory)
/// 5. `CASEBOOK_*` environment variables
pub fn load_config() -> Result<CasebookConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<CasebookConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CasebookConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CasebookConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CasebookConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CasebookConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("casebook").join(LOCAL_CONFIG_FILE))
                .unwrap_or_default(),
        ))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment variable provider with explicit section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `CASEBOOK_SMTP_FROM_ADDRESS` must map to `smtp.from_address`.
fn env_provider() -> Env {
    Env::prefixed("CASEBOOK_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("smtp_", "smtp.", 1)
            .replacen("links_", "links.", 1)
            .replacen("chat_", "chat.", 1)
            .replacen("session_", "session.", 1)
            .replacen("registration_", "registration.", 1);
        mapped.into()
    })
}
