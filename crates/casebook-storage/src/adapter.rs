// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use casebook_config::model::StorageConfig;
use casebook_core::types::{
    Case, CaseId, CaseStatus, Message, NewCase, NewUser, User, UserId, UserUpdate,
};
use casebook_core::{AdapterType, CasebookError, HealthStatus, PluginAdapter, StorageAdapter};

use crate::database::{map_tr_err, Database};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// The database is opened by [`StorageAdapter::initialize`]; every other call
/// fails with a storage error until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, CasebookError> {
        self.db
            .get()
            .ok_or_else(|| CasebookError::storage("storage not initialized -- call initialize() first"))
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, CasebookError> {
        self.db()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CasebookError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), CasebookError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| CasebookError::storage("storage already initialized"))?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), CasebookError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Cases ---

    async fn create_case(
        &self,
        case: &NewCase,
        first_message: &str,
    ) -> Result<(Case, Message), CasebookError> {
        queries::cases::create_case(self.db()?, case, first_message).await
    }

    async fn get_case(&self, id: CaseId) -> Result<Option<Case>, CasebookError> {
        queries::cases::get_case(self.db()?, id).await
    }

    async fn find_case_by_chat_token(&self, token: &str) -> Result<Option<Case>, CasebookError> {
        queries::cases::find_by_chat_token(self.db()?, token).await
    }

    async fn list_cases(&self) -> Result<Vec<Case>, CasebookError> {
        queries::cases::list_cases(self.db()?).await
    }

    async fn list_cases_for_handler(&self, handler: UserId) -> Result<Vec<Case>, CasebookError> {
        queries::cases::list_cases_for_handler(self.db()?, handler).await
    }

    async fn update_case_status(
        &self,
        id: CaseId,
        from: CaseStatus,
        to: CaseStatus,
    ) -> Result<bool, CasebookError> {
        queries::cases::update_status(self.db()?, id, from, to).await
    }

    async fn assign_handler(&self, id: CaseId, handler: UserId) -> Result<bool, CasebookError> {
        queries::cases::assign_handler(self.db()?, id, handler).await
    }

    // --- Messages ---

    async fn append_message(
        &self,
        case_id: CaseId,
        text: &str,
        is_sender_customer: bool,
    ) -> Result<Option<Message>, CasebookError> {
        queries::messages::append_message(self.db()?, case_id, text, is_sender_customer).await
    }

    async fn list_messages(&self, case_id: CaseId) -> Result<Vec<Message>, CasebookError> {
        queries::messages::list_messages(self.db()?, case_id).await
    }

    // --- Users ---

    async fn create_user(&self, user: &NewUser) -> Result<User, CasebookError> {
        queries::users::create_user(self.db()?, user).await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, CasebookError> {
        queries::users::get_user(self.db()?, id).await
    }

    async fn find_user_by_name(&self, user_name: &str) -> Result<Option<User>, CasebookError> {
        queries::users::find_by_name(self.db()?, user_name).await
    }

    async fn find_pending_by_register_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, CasebookError> {
        queries::users::find_pending_by_register_token(self.db()?, token).await
    }

    async fn complete_registration(
        &self,
        user_name: &str,
        password_hash: &str,
    ) -> Result<bool, CasebookError> {
        queries::users::complete_registration(self.db()?, user_name, password_hash).await
    }

    async fn complete_registration_by_token(
        &self,
        token: &str,
        password_hash: &str,
    ) -> Result<bool, CasebookError> {
        queries::users::complete_registration_by_token(self.db()?, token, password_hash).await
    }

    async fn list_users(&self) -> Result<Vec<User>, CasebookError> {
        queries::users::list_users(self.db()?).await
    }

    async fn update_user(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> Result<Option<User>, CasebookError> {
        queries::users::update_user(self.db()?, id, update).await
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, CasebookError> {
        queries::users::delete_user(self.db()?, id).await
    }
}
