// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound email transport.

use async_trait::async_trait;

use crate::error::CasebookError;
use crate::traits::adapter::PluginAdapter;

/// A fully rendered email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Adapter that delivers a rendered email.
///
/// Errors returned here are reported to the dispatcher, which logs and
/// swallows them. They never reach the caller of a desk operation.
#[async_trait]
pub trait NotifierAdapter: PluginAdapter {
    async fn send(&self, email: &OutboundEmail) -> Result<(), CasebookError>;
}
