// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Explicit per-request identity for authenticated back-office users.
//!
//! An `IdentityContext` is a snapshot taken at login. It is passed into each
//! operation instead of being read from ambient session state, and it is not
//! re-validated against the store: a role revoked after login stays in effect
//! for that session until it expires or logs out.

use serde::{Deserialize, Serialize};

use crate::error::CasebookError;
use crate::types::{Role, User, UserId};

/// Snapshot of an authenticated user at login time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityContext {
    pub user_id: UserId,
    pub user_name: String,
    pub role: Role,
    /// When the snapshot was taken.
    pub issued_at: String,
}

impl IdentityContext {
    pub fn from_user(user: &User, issued_at: String) -> Self {
        Self {
            user_id: user.id,
            user_name: user.user_name.clone(),
            role: user.role,
            issued_at,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails with `Forbidden` unless the snapshot carries the admin role.
    pub fn require_admin(&self) -> Result<(), CasebookError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(CasebookError::Forbidden(
                "only admins can perform this action".to_string(),
            ))
        }
    }
}
