// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Casebook support desk.
//!
//! WAL-mode SQLite with embedded migrations. Every statement goes through
//! one `tokio-rusqlite` connection, so conditional updates on case status,
//! case handler and registration state are serialized.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
