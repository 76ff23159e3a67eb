// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Casebook support desk.
//!
//! This crate provides the error taxonomy, domain types, the per-request
//! identity snapshot and the adapter traits that storage, notification and
//! chat transports implement.

pub mod error;
pub mod identity;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CasebookError;
pub use identity::IdentityContext;
pub use types::{AdapterType, CaseId, HealthStatus, MessageId, UserId};

// Re-export all adapter traits at crate root.
pub use traits::{ChatFeed, NotifierAdapter, OutboundEmail, PluginAdapter, StorageAdapter};
