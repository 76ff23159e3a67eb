// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password login and account administration.

use std::sync::Arc;

use casebook_core::types::{NewUser, Role, User, UserId, UserStatus, UserUpdate};
use casebook_core::{CasebookError, IdentityContext, StorageAdapter};
use serde::Deserialize;
use tracing::{info, warn};

use crate::password::{hash_password, verify_password};
use crate::registration::{check_password, normalize_email};

/// Partial update of an account as submitted by an admin.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Decoded permissively; unknown roles become `customer_support`.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Clone)]
pub struct Accounts {
    storage: Arc<dyn StorageAdapter>,
    min_password_length: usize,
}

impl Accounts {
    pub fn new(storage: Arc<dyn StorageAdapter>, min_password_length: usize) -> Self {
        Self {
            storage,
            min_password_length,
        }
    }

    /// Check credentials and take an identity snapshot.
    ///
    /// Pending and inactive accounts cannot log in. Unknown user and wrong
    /// password give the same message.
    pub async fn authenticate(
        &self,
        user_name: &str,
        password: &str,
    ) -> Result<IdentityContext, CasebookError> {
        let invalid = || CasebookError::Unauthorized("invalid user name or password".to_string());

        let user = self
            .storage
            .find_user_by_name(user_name.trim())
            .await?
            .ok_or_else(invalid)?;

        // Pending accounts have no password yet.
        if user.status == UserStatus::Pending {
            return Err(CasebookError::Unauthorized(
                "registration not completed".to_string(),
            ));
        }
        let matches = user
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(password, hash));
        if !matches {
            warn!(user_id = %user.id, "failed login");
            return Err(invalid());
        }
        if !user.active {
            return Err(CasebookError::Unauthorized("account is inactive".to_string()));
        }

        info!(user_id = %user.id, role = %user.role, "login");
        Ok(IdentityContext::from_user(&user, now()))
    }

    pub async fn list_users(&self, identity: &IdentityContext) -> Result<Vec<User>, CasebookError> {
        identity.require_admin()?;
        self.storage.list_users().await
    }

    pub async fn update_user(
        &self,
        identity: &IdentityContext,
        id: UserId,
        patch: UserPatch,
    ) -> Result<User, CasebookError> {
        identity.require_admin()?;

        let user_name = match patch.user_name.as_deref().map(str::trim) {
            Some("") => {
                return Err(CasebookError::Validation(
                    "user_name must not be empty".to_string(),
                ));
            }
            other => other.map(str::to_string),
        };
        let role = patch.role.as_deref().map(|raw| {
            let decoded = Role::decode(Some(raw));
            if decoded.fallback_applied {
                warn!(raw, fallback = %decoded.value, "unrecognized role on update");
            }
            decoded.value
        });
        let update = UserUpdate {
            user_name,
            email: normalize_email(patch.email.as_deref())?,
            role,
            active: patch.active,
        };

        if update.is_empty() {
            return self.storage.get_user(id).await?.ok_or(CasebookError::NotFound);
        }
        let user = self
            .storage
            .update_user(id, &update)
            .await?
            .ok_or(CasebookError::NotFound)?;
        info!(user_id = %id, by = %identity.user_id, "user updated");
        Ok(user)
    }

    /// Remove an account. Admins cannot delete themselves.
    pub async fn delete_user(
        &self,
        identity: &IdentityContext,
        id: UserId,
    ) -> Result<(), CasebookError> {
        identity.require_admin()?;
        if id == identity.user_id {
            return Err(CasebookError::Conflict(
                "cannot delete your own account".to_string(),
            ));
        }
        if !self.storage.delete_user(id).await? {
            return Err(CasebookError::NotFound);
        }
        info!(user_id = %id, by = %identity.user_id, "user deleted");
        Ok(())
    }

    /// Create an active admin that skips the invitation step.
    pub async fn bootstrap_admin(
        &self,
        user_name: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<User, CasebookError> {
        let user_name = user_name.trim();
        if user_name.is_empty() {
            return Err(CasebookError::Validation("user_name is required".to_string()));
        }
        check_password(password, self.min_password_length)?;
        let user = self
            .storage
            .create_user(&NewUser {
                user_name: user_name.to_string(),
                email: normalize_email(email)?,
                role: Role::Admin,
                active: true,
                status: UserStatus::Complete,
                password_hash: Some(hash_password(password)?),
            })
            .await?;
        info!(user_id = %user.id, "admin account bootstrapped");
        Ok(user)
    }
}

fn now() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}
