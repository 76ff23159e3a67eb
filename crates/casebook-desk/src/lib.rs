// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Support desk services.
//!
//! [`Desk`] wires the token resolver, the case lifecycle, the chat feed, the
//! registration flow and account administration over one storage adapter and
//! one notification dispatcher. Transports hold a `Desk` and call into it;
//! none of these services keeps state of its own between calls.

pub mod accounts;
pub mod chat;
pub mod lifecycle;
pub mod password;
pub mod registration;
pub mod resolver;

use std::sync::Arc;

use casebook_config::model::CasebookConfig;
use casebook_core::{CasebookError, HealthStatus, StorageAdapter};
use casebook_notify::NotificationDispatcher;

pub use accounts::{Accounts, UserPatch};
pub use chat::{order_messages, PollingChatFeed};
pub use lifecycle::CaseLifecycle;
pub use registration::{InviteRequest, RegistrationFlow};
pub use resolver::{Resolved, TokenKind, TokenResolver};

/// Tunables the desk services read from configuration.
#[derive(Debug, Clone, Copy)]
pub struct DeskSettings {
    pub poll_interval_ms: u64,
    pub min_password_length: usize,
}

impl DeskSettings {
    pub fn from_config(config: &CasebookConfig) -> Self {
        Self {
            poll_interval_ms: config.chat.poll_interval_ms,
            min_password_length: config.registration.min_password_length,
        }
    }
}

impl Default for DeskSettings {
    fn default() -> Self {
        Self::from_config(&CasebookConfig::default())
    }
}

#[derive(Clone)]
pub struct Desk {
    pub resolver: TokenResolver,
    pub cases: CaseLifecycle,
    pub chat: PollingChatFeed,
    pub registration: RegistrationFlow,
    pub accounts: Accounts,
    storage: Arc<dyn StorageAdapter>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl Desk {
    /// Build the services. `storage` must already be initialized.
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        dispatcher: Arc<NotificationDispatcher>,
        settings: DeskSettings,
    ) -> Self {
        let resolver = TokenResolver::new(Arc::clone(&storage));
        Self {
            cases: CaseLifecycle::new(Arc::clone(&storage), Arc::clone(&dispatcher)),
            chat: PollingChatFeed::new(
                Arc::clone(&storage),
                resolver.clone(),
                settings.poll_interval_ms,
            ),
            registration: RegistrationFlow::new(
                Arc::clone(&storage),
                resolver.clone(),
                Arc::clone(&dispatcher),
                settings.min_password_length,
            ),
            accounts: Accounts::new(Arc::clone(&storage), settings.min_password_length),
            resolver,
            storage,
            dispatcher,
        }
    }

    pub fn storage(&self) -> &Arc<dyn StorageAdapter> {
        &self.storage
    }

    pub fn dispatcher(&self) -> &Arc<NotificationDispatcher> {
        &self.dispatcher
    }

    /// Storage health decides the result. A failing notifier only degrades
    /// it, since email delivery never blocks a desk operation.
    pub async fn health(&self) -> Result<HealthStatus, CasebookError> {
        let storage = self.storage.health_check().await?;
        if !matches!(storage, HealthStatus::Healthy) {
            return Ok(storage);
        }
        match self.dispatcher.notifier().health_check().await {
            Ok(HealthStatus::Healthy) => Ok(HealthStatus::Healthy),
            Ok(HealthStatus::Degraded(reason)) | Ok(HealthStatus::Unhealthy(reason)) => {
                Ok(HealthStatus::Degraded(format!("notifier: {reason}")))
            }
            Err(e) => Ok(HealthStatus::Degraded(format!("notifier: {e}"))),
        }
    }

    /// Wait for in-flight notifications, then release the store.
    pub async fn shutdown(&self) -> Result<(), CasebookError> {
        self.dispatcher.flush().await;
        self.storage.close().await
    }
}
