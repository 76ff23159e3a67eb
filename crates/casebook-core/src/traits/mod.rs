// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Storage and notifier adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod chat;
pub mod notifier;
pub mod storage;

pub use adapter::PluginAdapter;
pub use chat::ChatFeed;
pub use notifier::{NotifierAdapter, OutboundEmail};
pub use storage::StorageAdapter;
