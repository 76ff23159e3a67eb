// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Casebook support desk.
//!
//! Customers reach their case through the chat token in the URL. Back-office
//! users log in for a session token and send it as a bearer credential; the
//! session resolves to the identity snapshot each desk operation receives.

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod server;
pub mod session;

pub use auth::AuthSession;
pub use error::{ApiError, ErrorResponse};
pub use extract::{ApiJson, ApiPath};
pub use server::{router, start_server, GatewayState, ServerConfig};
pub use session::SessionStore;
