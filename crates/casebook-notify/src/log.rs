// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notifier used when SMTP is disabled: emails go to the log.

use async_trait::async_trait;
use tracing::{debug, info};

use casebook_core::{
    AdapterType, CasebookError, HealthStatus, NotifierAdapter, OutboundEmail, PluginAdapter,
};

#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl PluginAdapter for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notifier
    }

    async fn health_check(&self) -> Result<HealthStatus, CasebookError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CasebookError> {
        Ok(())
    }
}

#[async_trait]
impl NotifierAdapter for LogNotifier {
    async fn send(&self, email: &OutboundEmail) -> Result<(), CasebookError> {
        info!(to = %email.to, subject = %email.subject, "smtp disabled, email not delivered");
        debug!(body = %email.html_body, "undelivered email body");
        Ok(())
    }
}
