// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound email notifications for the Casebook support desk.
//!
//! Events are rendered into HTML emails and delivered in the background.
//! With SMTP disabled, a [`LogNotifier`] records the email instead.

pub mod dispatcher;
pub mod event;
pub mod log;
pub mod smtp;

use std::sync::Arc;

use casebook_config::model::SmtpConfig;
use casebook_core::{CasebookError, NotifierAdapter};

pub use dispatcher::NotificationDispatcher;
pub use event::{NotificationEvent, Templates};
pub use log::LogNotifier;
pub use smtp::SmtpNotifier;

/// Pick the notifier for the given SMTP settings.
pub fn notifier_from_config(config: &SmtpConfig) -> Result<Arc<dyn NotifierAdapter>, CasebookError> {
    if config.enabled {
        Ok(Arc::new(SmtpNotifier::new(config)?))
    } else {
        Ok(Arc::new(LogNotifier))
    }
}
