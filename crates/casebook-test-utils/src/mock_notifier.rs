// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock notifier for deterministic testing.
//!
//! `MockNotifier` implements `NotifierAdapter` and captures every email it is
//! asked to send. It can be switched into a failing mode to check that a
//! broken mail transport never fails the operation that raised the event.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use casebook_core::{
    AdapterType, CasebookError, HealthStatus, NotifierAdapter, OutboundEmail, PluginAdapter,
};

pub struct MockNotifier {
    sent: Arc<Mutex<Vec<OutboundEmail>>>,
    failing: AtomicBool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failing: AtomicBool::new(false),
        }
    }

    /// A notifier whose every send fails.
    pub fn failing() -> Self {
        let notifier = Self::new();
        notifier.set_failing(true);
        notifier
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Emails accepted so far. Failed sends are not recorded.
    pub async fn sent_emails(&self) -> Vec<OutboundEmail> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockNotifier {
    fn name(&self) -> &str {
        "mock-notifier"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notifier
    }

    async fn health_check(&self) -> Result<HealthStatus, CasebookError> {
        if self.failing.load(Ordering::SeqCst) {
            Ok(HealthStatus::Unhealthy("mock failure".to_string()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }

    async fn shutdown(&self) -> Result<(), CasebookError> {
        Ok(())
    }
}

#[async_trait]
impl NotifierAdapter for MockNotifier {
    async fn send(&self, email: &OutboundEmail) -> Result<(), CasebookError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CasebookError::Notification {
                message: "mock transport refused the email".to_string(),
                source: None,
            });
        }
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}
