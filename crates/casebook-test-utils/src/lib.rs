// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Casebook integration tests.
//!
//! Provides a mock notifier and a harness that assembles the full desk over
//! a throwaway SQLite database, so flow tests need no external services.

pub mod harness;
pub mod mock_notifier;

pub use harness::{case_draft, TestHarness, TEST_PASSWORD};
pub use mock_notifier::MockNotifier;
