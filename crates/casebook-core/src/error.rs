// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Casebook support desk.

use thiserror::Error;

/// The primary error type used across all Casebook adapters and services.
///
/// `NotFound` deliberately carries no detail: an unknown token, a malformed
/// token and an unknown id all render the same message.
#[derive(Debug, Error)]
pub enum CasebookError {
    /// Missing required field, empty message text, password too short.
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown token, case or user.
    #[error("not found")]
    NotFound,

    /// The record is not in a state that allows the operation
    /// (registration already redeemed, case closed, handler already set).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Credentials missing, wrong, or belonging to an account that cannot log in.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated identity lacks the role the operation requires.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Outbound notification failures. Never surfaced to callers of desk operations.
    #[error("notification error: {message}")]
    Notification {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CasebookError {
    /// Shorthand for wrapping any storage-layer error.
    pub fn storage<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Storage {
            source: source.into(),
        }
    }

    /// Returns true for errors caused by the caller's input or the record's state,
    /// as opposed to a failing dependency.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::NotFound
                | Self::Conflict(_)
                | Self::Unauthorized(_)
                | Self::Forbidden(_)
        )
    }
}
