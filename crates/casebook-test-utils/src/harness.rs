// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end desk tests.
//!
//! `TestHarness` assembles a complete [`Desk`] over a temp SQLite database and
//! a [`MockNotifier`]. The database lives as long as the harness.

use std::sync::Arc;

use casebook_config::model::{CasebookConfig, StorageConfig};
use casebook_core::types::{CaseDraft, NewUser, Role, UserStatus};
use casebook_core::{CasebookError, IdentityContext, StorageAdapter};
use casebook_desk::password::hash_password;
use casebook_desk::{Desk, DeskSettings};
use casebook_notify::{NotificationDispatcher, Templates};
use casebook_storage::SqliteStorage;

use crate::mock_notifier::MockNotifier;

/// Password given to every seeded account.
pub const TEST_PASSWORD: &str = "correct horse";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    failing_notifier: bool,
    settings: DeskSettings,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            failing_notifier: false,
            settings: DeskSettings::default(),
        }
    }

    /// Make every email send fail.
    pub fn with_failing_notifier(mut self) -> Self {
        self.failing_notifier = true;
        self
    }

    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.settings.poll_interval_ms = poll_interval_ms;
        self
    }

    pub fn with_min_password_length(mut self, min_password_length: usize) -> Self {
        self.settings.min_password_length = min_password_length;
        self
    }

    pub async fn build(self) -> Result<TestHarness, CasebookError> {
        let temp_dir = tempfile::TempDir::new().map_err(CasebookError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        });
        storage.initialize().await?;
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let notifier = Arc::new(if self.failing_notifier {
            MockNotifier::failing()
        } else {
            MockNotifier::new()
        });

        let config = CasebookConfig::default();
        let dispatcher = Arc::new(NotificationDispatcher::new(
            notifier.clone(),
            Templates::from_config(&config),
        ));
        let desk = Desk::new(Arc::clone(&storage), dispatcher, self.settings);

        Ok(TestHarness {
            desk,
            storage,
            notifier,
            config,
            _temp_dir: temp_dir,
        })
    }
}

pub struct TestHarness {
    pub desk: Desk,
    /// SQLite storage adapter (temp DB, removed on drop).
    pub storage: Arc<dyn StorageAdapter>,
    pub notifier: Arc<MockNotifier>,
    /// Defaults used to render email links.
    pub config: CasebookConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default settings and a working notifier.
    pub async fn new() -> Result<Self, CasebookError> {
        Self::builder().build().await
    }

    /// Create an active admin and log in as them.
    pub async fn seed_admin(&self, user_name: &str) -> Result<IdentityContext, CasebookError> {
        self.desk
            .accounts
            .bootstrap_admin(user_name, TEST_PASSWORD, None)
            .await?;
        self.desk.accounts.authenticate(user_name, TEST_PASSWORD).await
    }

    /// Create an active, registered customer-support agent and log in as them.
    pub async fn seed_agent(&self, user_name: &str) -> Result<IdentityContext, CasebookError> {
        self.storage
            .create_user(&NewUser {
                user_name: user_name.to_string(),
                email: Some(format!("{user_name}@desk.test")),
                role: Role::CustomerSupport,
                active: true,
                status: UserStatus::Complete,
                password_hash: Some(hash_password(TEST_PASSWORD)?),
            })
            .await?;
        self.desk.accounts.authenticate(user_name, TEST_PASSWORD).await
    }

    /// Wait until every dispatched notification has been handled.
    pub async fn flush_notifications(&self) {
        self.desk.dispatcher().flush().await;
    }
}

/// A valid case submission.
pub fn case_draft(title: &str) -> CaseDraft {
    CaseDraft {
        title: title.to_string(),
        customer_first_name: "Jane".to_string(),
        customer_last_name: "Doe".to_string(),
        customer_email: "jane@example.com".to_string(),
        status: None,
        category: None,
    }
}
