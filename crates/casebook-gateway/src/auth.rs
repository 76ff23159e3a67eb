// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session authentication middleware for back-office routes.
//!
//! Requests carry `Authorization: Bearer <session token>`. A live session
//! attaches an [`AuthSession`] to the request extensions; anything else is
//! rejected with 401 before the handler runs.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use casebook_core::{CasebookError, IdentityContext};

use crate::error::ApiError;
use crate::session::SessionStore;

/// The authenticated caller of a back-office request.
#[derive(Clone)]
pub struct AuthSession {
    pub token: String,
    pub identity: IdentityContext,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("token", &"[redacted]")
            .field("identity", &self.identity)
            .finish()
    }
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub async fn require_session(
    State(sessions): State<SessionStore>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| CasebookError::Unauthorized("login required".to_string()))?
        .to_string();
    let identity = sessions
        .get(&token)
        .ok_or_else(|| CasebookError::Unauthorized("session expired or unknown".to_string()))?;

    request
        .extensions_mut()
        .insert(AuthSession { token, identity });
    Ok(next.run(request).await)
}
