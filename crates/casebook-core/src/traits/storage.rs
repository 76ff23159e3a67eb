// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::CasebookError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    Case, CaseId, CaseStatus, Message, NewCase, NewUser, User, UserId, UserUpdate,
};

/// Adapter for the durable case, message and user records.
///
/// Implementations must give read-committed isolation or stronger. The
/// conditional updates (`update_case_status`, `assign_handler`,
/// `complete_registration*`) match on the current row state and report
/// whether a row matched; callers decide what a miss means.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), CasebookError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), CasebookError>;

    // --- Cases ---

    /// Insert a case and its first customer message as one unit.
    ///
    /// The store generates the id, the chat token and both timestamps.
    async fn create_case(
        &self,
        case: &NewCase,
        first_message: &str,
    ) -> Result<(Case, Message), CasebookError>;

    async fn get_case(&self, id: CaseId) -> Result<Option<Case>, CasebookError>;

    async fn find_case_by_chat_token(&self, token: &str) -> Result<Option<Case>, CasebookError>;

    async fn list_cases(&self) -> Result<Vec<Case>, CasebookError>;

    async fn list_cases_for_handler(&self, handler: UserId) -> Result<Vec<Case>, CasebookError>;

    /// Move a case from `from` to `to` if it is still in `from`.
    ///
    /// Stamps `opened_at` on entering `Open` and `closed_at` on entering
    /// `Closed`, each only if not already set. Returns false when no row matched.
    async fn update_case_status(
        &self,
        id: CaseId,
        from: CaseStatus,
        to: CaseStatus,
    ) -> Result<bool, CasebookError>;

    /// Set the handler of a non-closed case that has no handler or already has
    /// this one. An `Unopened` case becomes `Open`. Returns false when no row matched.
    async fn assign_handler(&self, id: CaseId, handler: UserId) -> Result<bool, CasebookError>;

    // --- Messages ---

    /// Append a message with a store-assigned timestamp.
    /// Returns `None` if the case does not exist.
    async fn append_message(
        &self,
        case_id: CaseId,
        text: &str,
        is_sender_customer: bool,
    ) -> Result<Option<Message>, CasebookError>;

    /// All messages of a case, ascending by timestamp.
    async fn list_messages(&self, case_id: CaseId) -> Result<Vec<Message>, CasebookError>;

    // --- Users ---

    /// Insert an account. Pending accounts receive a fresh register token,
    /// generated in the same write.
    async fn create_user(&self, user: &NewUser) -> Result<User, CasebookError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, CasebookError>;

    /// Case-insensitive lookup by user name.
    async fn find_user_by_name(&self, user_name: &str) -> Result<Option<User>, CasebookError>;

    /// Lookup scoped to `status = pending`; a redeemed token finds nothing.
    async fn find_pending_by_register_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, CasebookError>;

    /// Set the password and flip to `complete` WHERE the user name matches
    /// (case-insensitive) AND status is still pending. Returns false on no match.
    async fn complete_registration(
        &self,
        user_name: &str,
        password_hash: &str,
    ) -> Result<bool, CasebookError>;

    /// Same conditional update, keyed by register token.
    async fn complete_registration_by_token(
        &self,
        token: &str,
        password_hash: &str,
    ) -> Result<bool, CasebookError>;

    async fn list_users(&self) -> Result<Vec<User>, CasebookError>;

    /// Apply a partial update. Returns `None` if the user does not exist.
    async fn update_user(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> Result<Option<User>, CasebookError>;

    /// Remove the row. Returns false if it did not exist.
    async fn delete_user(&self, id: UserId) -> Result<bool, CasebookError>;
}
