// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from desk errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use casebook_core::CasebookError;
use serde::{Deserialize, Serialize};

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A desk error on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub CasebookError);

impl From<CasebookError> for ApiError {
    fn from(e: CasebookError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CasebookError::Validation(_) => StatusCode::BAD_REQUEST,
            CasebookError::NotFound => StatusCode::NOT_FOUND,
            CasebookError::Conflict(_) => StatusCode::CONFLICT,
            CasebookError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            CasebookError::Forbidden(_) => StatusCode::FORBIDDEN,
            CasebookError::Storage { .. }
            | CasebookError::Notification { .. }
            | CasebookError::Config(_)
            | CasebookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = if self.0.is_client_error() {
            self.0.to_string()
        } else {
            // Dependency detail stays in the log.
            tracing::error!(error = %self.0, "request failed");
            "internal server error".to_string()
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}
