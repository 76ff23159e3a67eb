// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget delivery of notification events.
//!
//! `dispatch` returns immediately. Delivery runs on a tracked task, and a
//! failure is logged at warn level and then dropped: it never reaches the
//! operation that raised the event.

use std::sync::Arc;

use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use casebook_core::NotifierAdapter;

use crate::event::{NotificationEvent, Templates};

pub struct NotificationDispatcher {
    notifier: Arc<dyn NotifierAdapter>,
    templates: Templates,
    tracker: TaskTracker,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn NotifierAdapter>, templates: Templates) -> Self {
        Self {
            notifier,
            templates,
            tracker: TaskTracker::new(),
        }
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    pub fn notifier(&self) -> &Arc<dyn NotifierAdapter> {
        &self.notifier
    }

    /// Render `event` and hand it to the notifier in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn dispatch(&self, event: NotificationEvent) {
        let kind = event.kind();
        let Some(email) = event.render(&self.templates) else {
            debug!(kind, "no recipient, notification skipped");
            return;
        };

        let notifier = Arc::clone(&self.notifier);
        self.tracker.spawn(async move {
            match notifier.send(&email).await {
                Ok(()) => info!(kind, to = %email.to, "notification sent"),
                Err(e) => warn!(kind, to = %email.to, error = %e, "notification failed"),
            }
        });
    }

    /// Number of deliveries still in flight.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Wait for every in-flight delivery. New dispatches are accepted again
    /// once this returns.
    pub async fn flush(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}
