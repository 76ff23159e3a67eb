// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Case lifecycle: creation, status transitions and handler assignment.
//!
//! Status only moves forward (`Unopened -> Open -> Closed`). Every
//! transition is a compare-and-set against the store, so two agents racing
//! on the same case cannot move it backwards.

use std::sync::Arc;

use casebook_core::types::{
    Case, CaseCategory, CaseDraft, CaseId, CaseStatus, Message, NewCase, UserId, UserStatus,
};
use casebook_core::{CasebookError, IdentityContext, StorageAdapter};
use casebook_notify::{NotificationDispatcher, NotificationEvent};
use tracing::{info, warn};

/// A transition can lose at most this many races before the state is terminal.
const MAX_TRANSITION_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct CaseLifecycle {
    storage: Arc<dyn StorageAdapter>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl CaseLifecycle {
    pub fn new(storage: Arc<dyn StorageAdapter>, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self {
            storage,
            dispatcher,
        }
    }

    /// Create a case together with its first customer message.
    ///
    /// Only `title` and `customer_email` are required; the customer's names
    /// are stored trimmed and may be blank. Unrecognized `status` or
    /// `category` input falls back to `Unopened` /
    /// `Other` and is logged. A case cannot be created already closed. The
    /// customer is emailed a chat link after the rows are committed; a
    /// failed email does not fail the call.
    pub async fn create_case(
        &self,
        draft: CaseDraft,
        first_message: &str,
    ) -> Result<(Case, Message), CasebookError> {
        let title = required(&draft.title, "title")?;
        let email = required(&draft.customer_email, "customer_email")?;
        if !email.contains('@') {
            return Err(CasebookError::Validation(
                "customer_email must be an email address".to_string(),
            ));
        }
        if first_message.trim().is_empty() {
            return Err(CasebookError::Validation(
                "first message must not be empty".to_string(),
            ));
        }

        let status = CaseStatus::decode(draft.status.as_deref());
        if status.fallback_applied {
            warn!(raw = ?draft.status, fallback = %status.value, "unrecognized case status");
        }
        let status = if status.value.is_terminal() {
            warn!(fallback = %CaseStatus::Unopened, "case cannot be created closed");
            CaseStatus::Unopened
        } else {
            status.value
        };

        let category = CaseCategory::decode(draft.category.as_deref());
        if category.fallback_applied {
            warn!(raw = ?draft.category, fallback = %category.value, "unrecognized case category");
        }

        let new_case = NewCase {
            status,
            category: category.value,
            title: title.to_string(),
            customer_first_name: draft.customer_first_name.trim().to_string(),
            customer_last_name: draft.customer_last_name.trim().to_string(),
            customer_email: email.to_string(),
        };
        let (case, message) = self.storage.create_case(&new_case, first_message).await?;
        info!(case_id = %case.id, status = %case.status, category = %case.category, "case created");

        self.dispatcher.dispatch(NotificationEvent::CaseCreated {
            to: case.customer_email.clone(),
            customer_first_name: case.customer_first_name.clone(),
            title: case.title.clone(),
            first_message: message.text.clone(),
            chat_token: case.chat_token.clone(),
        });

        Ok((case, message))
    }

    pub async fn get_case(&self, id: CaseId) -> Result<Case, CasebookError> {
        self.storage.get_case(id).await?.ok_or(CasebookError::NotFound)
    }

    /// Close a case. Closing an already closed case succeeds and leaves
    /// `closed_at` at the first close.
    pub async fn close_case(&self, id: CaseId) -> Result<Case, CasebookError> {
        self.transition(id, CaseStatus::Closed).await
    }

    /// Move an unopened case to `Open` without assigning a handler.
    /// Idempotent on an open case; a closed case is a `Conflict`.
    pub async fn open_case(&self, id: CaseId) -> Result<Case, CasebookError> {
        self.transition(id, CaseStatus::Open).await
    }

    async fn transition(&self, id: CaseId, target: CaseStatus) -> Result<Case, CasebookError> {
        for _ in 0..MAX_TRANSITION_ATTEMPTS {
            let case = self.get_case(id).await?;
            if case.status == target {
                return Ok(case);
            }
            if !case.status.can_transition_to(target) {
                return Err(CasebookError::Conflict(format!(
                    "case is {} and cannot become {target}",
                    case.status
                )));
            }
            if self
                .storage
                .update_case_status(id, case.status, target)
                .await?
            {
                info!(case_id = %id, from = %case.status, to = %target, "case status changed");
                return self.get_case(id).await;
            }
            // Lost a race; re-read and decide again.
        }
        Err(CasebookError::Conflict(
            "case changed concurrently, retry".to_string(),
        ))
    }

    /// Assign `handler` to a case, opening it if unopened.
    ///
    /// Agents may claim a case for themselves; assigning someone else needs
    /// the admin role. Fails with `Conflict` on a closed case or when another
    /// agent already handles it. Re-assigning the current handler succeeds.
    pub async fn assign_handler(
        &self,
        identity: &IdentityContext,
        id: CaseId,
        handler: UserId,
    ) -> Result<Case, CasebookError> {
        if handler != identity.user_id {
            identity.require_admin()?;
        }

        let agent = self
            .storage
            .get_user(handler)
            .await?
            .ok_or(CasebookError::NotFound)?;
        if agent.status == UserStatus::Pending || !agent.active {
            return Err(CasebookError::Conflict(format!(
                "user `{}` cannot handle cases",
                agent.user_name
            )));
        }

        if self.storage.assign_handler(id, handler).await? {
            info!(case_id = %id, handler = %handler, by = %identity.user_id, "case handler assigned");
            return self.get_case(id).await;
        }

        let case = self.get_case(id).await?;
        if case.status.is_terminal() {
            Err(CasebookError::Conflict("case is closed".to_string()))
        } else {
            Err(CasebookError::Conflict(
                "case already has a handler".to_string(),
            ))
        }
    }

    pub async fn list_cases(&self) -> Result<Vec<Case>, CasebookError> {
        self.storage.list_cases().await
    }

    pub async fn list_cases_for_handler(&self, handler: UserId) -> Result<Vec<Case>, CasebookError> {
        self.storage.list_cases_for_handler(handler).await
    }
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, CasebookError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CasebookError::Validation(format!("{field} is required")))
    } else {
        Ok(trimmed)
    }
}
