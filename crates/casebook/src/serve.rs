// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `casebook serve` command implementation.
//!
//! Opens the SQLite store, picks the notifier, assembles the desk and serves
//! the HTTP gateway until a shutdown signal arrives. In-flight notifications
//! are drained before the store is closed.

use std::sync::Arc;
use std::time::Duration;

use casebook_config::model::CasebookConfig;
use casebook_core::{CasebookError, PluginAdapter, StorageAdapter};
use casebook_desk::{Desk, DeskSettings};
use casebook_gateway::{start_server, GatewayState, ServerConfig, SessionStore};
use casebook_notify::{notifier_from_config, NotificationDispatcher, Templates};
use casebook_storage::SqliteStorage;
use tracing::{info, warn};

use crate::shutdown;

/// Open storage and wire every desk service from configuration.
pub async fn build_desk(config: &CasebookConfig) -> Result<Desk, CasebookError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

    let notifier = notifier_from_config(&config.smtp)?;
    info!(notifier = notifier.name(), "notifier ready");
    let dispatcher = Arc::new(NotificationDispatcher::new(
        notifier,
        Templates::from_config(config),
    ));

    Ok(Desk::new(storage, dispatcher, DeskSettings::from_config(config)))
}

/// Runs the `casebook serve` command.
pub async fn run_serve(config: CasebookConfig) -> Result<(), CasebookError> {
    info!(service = %config.service.name, "starting casebook serve");

    let desk = build_desk(&config).await?;
    let sessions = SessionStore::new(Duration::from_secs(config.session.idle_timeout_secs));
    let state = GatewayState::new(desk.clone(), sessions);

    let cancel = shutdown::install_signal_handler();
    let result = start_server(&ServerConfig::from_config(&config), state, cancel).await;

    let pending = desk.dispatcher().pending();
    if pending > 0 {
        info!(pending, "waiting for notifications to finish");
    }
    desk.shutdown().await?;
    if let Err(e) = desk.dispatcher().notifier().shutdown().await {
        warn!(error = %e, "notifier shutdown failed");
    }
    info!("casebook stopped");
    result
}
