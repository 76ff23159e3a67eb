// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps opaque tokens to the record they grant access to.
//!
//! Resolution is read-only. Every failure, whether the token is unknown,
//! malformed or already redeemed, is the same `NotFound`.

use std::sync::Arc;

use casebook_core::types::{Case, User};
use casebook_core::{CasebookError, StorageAdapter};
use tracing::debug;

/// Which kind of credential a token is presented as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Customer chat access; valid for the life of the case.
    Chat,
    /// Single-use invitation; valid only while the account is pending.
    Registration,
}

/// What a token resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Case(Case),
    PendingUser(User),
}

#[derive(Clone)]
pub struct TokenResolver {
    storage: Arc<dyn StorageAdapter>,
}

impl TokenResolver {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    pub async fn resolve(&self, token: &str, kind: TokenKind) -> Result<Resolved, CasebookError> {
        match kind {
            TokenKind::Chat => self.resolve_case(token).await.map(Resolved::Case),
            TokenKind::Registration => self
                .resolve_pending_user(token)
                .await
                .map(Resolved::PendingUser),
        }
    }

    pub async fn resolve_case(&self, token: &str) -> Result<Case, CasebookError> {
        if !well_formed(token) {
            debug!(kind = "chat", "rejected malformed token");
            return Err(CasebookError::NotFound);
        }
        self.storage
            .find_case_by_chat_token(token)
            .await?
            .ok_or(CasebookError::NotFound)
    }

    pub async fn resolve_pending_user(&self, token: &str) -> Result<User, CasebookError> {
        if !well_formed(token) {
            debug!(kind = "registration", "rejected malformed token");
            return Err(CasebookError::NotFound);
        }
        self.storage
            .find_pending_by_register_token(token)
            .await?
            .ok_or(CasebookError::NotFound)
    }
}

/// Tokens are issued as UUIDs; anything else cannot match a record.
pub(crate) fn well_formed(token: &str) -> bool {
    uuid::Uuid::parse_str(token).is_ok()
}
