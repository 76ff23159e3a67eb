// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pull-based chat synchronization.
//!
//! Clients re-fetch the whole conversation every poll interval and after each
//! message they send. There is no cursor and no server-side connection state;
//! a view is stale by at most one interval.

use std::sync::Arc;

use async_trait::async_trait;
use casebook_core::types::{Case, CaseId, ChatView, HandlerSummary, Message};
use casebook_core::{CasebookError, ChatFeed, IdentityContext, StorageAdapter};
use tracing::{debug, info};

use crate::resolver::TokenResolver;

/// Order messages for display: ascending timestamp, ties in the order given.
///
/// Read-time ordering is the only ordering guarantee; insertion order is not
/// trusted.
pub fn order_messages(mut messages: Vec<Message>) -> Vec<Message> {
    messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    messages
}

#[derive(Clone)]
pub struct PollingChatFeed {
    storage: Arc<dyn StorageAdapter>,
    resolver: TokenResolver,
    poll_interval_ms: u64,
}

impl PollingChatFeed {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        resolver: TokenResolver,
        poll_interval_ms: u64,
    ) -> Self {
        Self {
            storage,
            resolver,
            poll_interval_ms,
        }
    }

    pub fn poll_interval_ms(&self) -> u64 {
        self.poll_interval_ms
    }

    async fn view_of(&self, case: Case) -> Result<ChatView, CasebookError> {
        let messages = order_messages(self.storage.list_messages(case.id).await?);
        let handler = match case.handler {
            Some(id) => self
                .storage
                .get_user(id)
                .await?
                .map(|user| HandlerSummary {
                    id: user.id,
                    user_name: user.user_name,
                }),
            None => None,
        };
        Ok(ChatView {
            case,
            messages,
            handler,
            poll_interval_ms: self.poll_interval_ms,
        })
    }

    /// Customer posts through the chat token; the token is the whole check.
    pub async fn post_customer_message(
        &self,
        chat_token: &str,
        text: &str,
    ) -> Result<Message, CasebookError> {
        let case = self.resolver.resolve_case(chat_token).await?;
        self.post_message(case.id, text, true).await
    }

    /// Agent reply. Every back-office role may reply, so the session alone
    /// authorizes it. Messages carry no per-agent attribution, only the
    /// sender side.
    pub async fn post_agent_message(
        &self,
        identity: &IdentityContext,
        case_id: CaseId,
        text: &str,
    ) -> Result<Message, CasebookError> {
        let message = self.post_message(case_id, text, false).await?;
        info!(case_id = %case_id, user_id = %identity.user_id, "agent replied");
        Ok(message)
    }
}

#[async_trait]
impl ChatFeed for PollingChatFeed {
    async fn customer_view(&self, chat_token: &str) -> Result<ChatView, CasebookError> {
        let case = self.resolver.resolve_case(chat_token).await?;
        self.view_of(case).await
    }

    async fn agent_view(&self, case_id: CaseId) -> Result<ChatView, CasebookError> {
        let case = self
            .storage
            .get_case(case_id)
            .await?
            .ok_or(CasebookError::NotFound)?;
        self.view_of(case).await
    }

    async fn post_message(
        &self,
        case_id: CaseId,
        text: &str,
        is_sender_customer: bool,
    ) -> Result<Message, CasebookError> {
        if text.trim().is_empty() {
            return Err(CasebookError::Validation(
                "message text must not be empty".to_string(),
            ));
        }
        // Closed cases still accept messages.
        let message = self
            .storage
            .append_message(case_id, text, is_sender_customer)
            .await?
            .ok_or(CasebookError::NotFound)?;
        debug!(case_id = %case_id, message_id = %message.id, is_sender_customer, "message appended");
        Ok(message)
    }
}
