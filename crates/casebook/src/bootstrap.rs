// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `casebook bootstrap-admin`: create the first admin account.
//!
//! Every other account is invited by an admin, so a fresh database needs one
//! created out of band.

use casebook_config::model::CasebookConfig;
use casebook_core::CasebookError;
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::serve::build_desk;

/// Environment variable holding the admin password for headless setups.
pub const ADMIN_PASSWORD_ENV_VAR: &str = "CASEBOOK_ADMIN_PASSWORD";

/// Get the admin password from the environment or an interactive prompt.
///
/// Priority:
/// 1. `CASEBOOK_ADMIN_PASSWORD` (for Docker/systemd)
/// 2. TTY prompt via `rpassword`, entered twice
pub fn get_admin_password() -> Result<SecretString, CasebookError> {
    if let Ok(password) = std::env::var(ADMIN_PASSWORD_ENV_VAR)
        && !password.is_empty()
    {
        return Ok(SecretString::from(password));
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        eprint!("Admin password: ");
        let first = rpassword::read_password()
            .map_err(|e| CasebookError::Validation(format!("failed to read password: {e}")))?;
        eprint!("Confirm admin password: ");
        let second = rpassword::read_password()
            .map_err(|e| CasebookError::Validation(format!("failed to read password: {e}")))?;
        if first != second {
            return Err(CasebookError::Validation("passwords do not match".to_string()));
        }
        return Ok(SecretString::from(first));
    }

    Err(CasebookError::Validation(format!(
        "no password provided. Set {ADMIN_PASSWORD_ENV_VAR} or run interactively."
    )))
}

pub async fn run_bootstrap_admin(
    config: CasebookConfig,
    user_name: &str,
    email: Option<&str>,
    password: SecretString,
) -> Result<(), CasebookError> {
    let desk = build_desk(&config).await?;
    let result = desk
        .accounts
        .bootstrap_admin(user_name, password.expose_secret(), email)
        .await;
    desk.shutdown().await?;

    let user = result?;
    info!(user_id = %user.id, "admin created");
    println!("created admin `{}` (id {})", user.user_name, user.id);
    Ok(())
}
