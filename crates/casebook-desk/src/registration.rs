// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Invitation and registration of back-office accounts.
//!
//! An admin invites a user, which creates a `pending` account with a fresh
//! register token and emails the invitee a link. Redemption sets the
//! password with an update conditioned on `status = 'pending'`, so a token or
//! user name can be redeemed exactly once: the second attempt matches no row.

use std::sync::Arc;

use casebook_core::types::{NewUser, Role, User, UserStatus};
use casebook_core::{CasebookError, IdentityContext, StorageAdapter};
use casebook_notify::{NotificationDispatcher, NotificationEvent};
use serde::Deserialize;
use tracing::{info, warn};

use crate::password::hash_password;
use crate::resolver::TokenResolver;

/// Raw invitation input from an admin.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InviteRequest {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Decoded permissively; unknown roles become `customer_support`.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Clone)]
pub struct RegistrationFlow {
    storage: Arc<dyn StorageAdapter>,
    resolver: TokenResolver,
    dispatcher: Arc<NotificationDispatcher>,
    min_password_length: usize,
}

impl RegistrationFlow {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        resolver: TokenResolver,
        dispatcher: Arc<NotificationDispatcher>,
        min_password_length: usize,
    ) -> Self {
        Self {
            storage,
            resolver,
            dispatcher,
            min_password_length,
        }
    }

    /// Create a pending account and send the invitation.
    ///
    /// Returns the account and its register token. The email goes out after
    /// the row is committed and its failure is not reported here.
    pub async fn invite(
        &self,
        identity: &IdentityContext,
        request: InviteRequest,
    ) -> Result<(User, String), CasebookError> {
        identity.require_admin()?;

        let user_name = request.user_name.trim();
        if user_name.is_empty() {
            return Err(CasebookError::Validation("user_name is required".to_string()));
        }
        let email = normalize_email(request.email.as_deref())?;

        let role = Role::decode(request.role.as_deref());
        if role.fallback_applied {
            warn!(raw = ?request.role, fallback = %role.value, "unrecognized role on invite");
        }

        let user = self
            .storage
            .create_user(&NewUser {
                user_name: user_name.to_string(),
                email,
                role: role.value,
                active: request.active.unwrap_or(true),
                status: UserStatus::Pending,
                password_hash: None,
            })
            .await?;
        let register_token = user.register_token.clone().ok_or_else(|| {
            CasebookError::Internal("pending user created without a register token".to_string())
        })?;
        info!(user_id = %user.id, role = %user.role, by = %identity.user_id, "user invited");

        self.dispatcher.dispatch(NotificationEvent::UserInvited {
            to: user.email.clone(),
            user_name: user.user_name.clone(),
            register_token: register_token.clone(),
        });

        Ok((user, register_token))
    }

    /// User name of the pending account holding `token`, to pre-fill the form.
    pub async fn lookup_pending(&self, token: &str) -> Result<String, CasebookError> {
        Ok(self.resolver.resolve_pending_user(token).await?.user_name)
    }

    /// Set the password of a still-pending account, matched case-insensitively
    /// by user name. A second redemption is a `Conflict`, whatever the
    /// password. The pending check is repeated by the conditional update.
    pub async fn complete_registration(
        &self,
        user_name: &str,
        password: &str,
    ) -> Result<(), CasebookError> {
        let user_name = user_name.trim();
        if user_name.is_empty() {
            return Err(CasebookError::Validation("user_name is required".to_string()));
        }
        let pending = self
            .storage
            .find_user_by_name(user_name)
            .await?
            .is_some_and(|user| user.status == UserStatus::Pending);
        if !pending {
            return Err(already_registered());
        }
        let hash = self.hash_checked(password)?;
        if !self.storage.complete_registration(user_name, &hash).await? {
            return Err(already_registered());
        }
        info!(user_name, "registration completed");
        Ok(())
    }

    /// Same redemption keyed by register token. A token that no longer
    /// resolves is `NotFound`, matching `lookup_pending`.
    pub async fn complete_registration_by_token(
        &self,
        token: &str,
        password: &str,
    ) -> Result<(), CasebookError> {
        self.resolver.resolve_pending_user(token).await?;
        let hash = self.hash_checked(password)?;
        if !self
            .storage
            .complete_registration_by_token(token, &hash)
            .await?
        {
            return Err(CasebookError::NotFound);
        }
        info!("registration completed by token");
        Ok(())
    }

    fn hash_checked(&self, password: &str) -> Result<String, CasebookError> {
        check_password(password, self.min_password_length)?;
        hash_password(password)
    }
}

fn already_registered() -> CasebookError {
    CasebookError::Conflict("user not found or already registered".to_string())
}

pub(crate) fn check_password(password: &str, min_length: usize) -> Result<(), CasebookError> {
    if password.chars().count() < min_length {
        return Err(CasebookError::Validation(format!(
            "password must be at least {min_length} characters"
        )));
    }
    Ok(())
}

pub(crate) fn normalize_email(raw: Option<&str>) -> Result<Option<String>, CasebookError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(email) if email.contains('@') => Ok(Some(email.to_string())),
        Some(_) => Err(CasebookError::Validation(
            "email must be an email address".to_string(),
        )),
    }
}
