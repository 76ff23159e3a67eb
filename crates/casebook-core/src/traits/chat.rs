// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport-neutral port for chat synchronization.
//!
//! The shipped implementation is pull-based: every read returns the full
//! conversation and clients re-poll on an interval. A push transport can
//! implement the same trait without touching the case state machine.

use async_trait::async_trait;

use crate::error::CasebookError;
use crate::types::{CaseId, ChatView, Message};

#[async_trait]
pub trait ChatFeed: Send + Sync {
    /// Conversation for the holder of a chat token. The token is the only check.
    async fn customer_view(&self, chat_token: &str) -> Result<ChatView, CasebookError>;

    /// Conversation for a back-office agent. Role checks happen before this call.
    async fn agent_view(&self, case_id: CaseId) -> Result<ChatView, CasebookError>;

    /// Append a message. Rejects blank text and unknown cases.
    async fn post_message(
        &self,
        case_id: CaseId,
        text: &str,
        is_sender_customer: bool,
    ) -> Result<Message, CasebookError>;
}
