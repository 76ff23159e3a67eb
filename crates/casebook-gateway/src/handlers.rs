// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Handlers decode the request, call into the desk and encode the result.
//! Authorization beyond "has a session" is the desk's job.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use casebook_core::types::{Case, CaseDraft, CaseId, ChatView, Message, User, UserId};
use casebook_core::{CasebookError, ChatFeed, HealthStatus, IdentityContext};
use casebook_desk::{InviteRequest, UserPatch};
use serde::{Deserialize, Serialize};

use crate::auth::AuthSession;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::server::GatewayState;

type ApiResult<T> = Result<T, ApiError>;

// --- Request / response bodies ---

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub user_name: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: IdentityContext,
}

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub text: String,
}

/// POST /v1/cases body: the case fields plus the opening message.
#[derive(Debug, Deserialize)]
pub struct CreateCaseRequest {
    #[serde(default)]
    pub case: CaseDraft,
    pub message: MessageBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCaseResponse {
    pub case_id: CaseId,
    pub chat_token: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AssignRequest {
    /// Defaults to the caller.
    #[serde(default)]
    pub handler_id: Option<UserId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InviteResponse {
    pub user: User,
    pub register_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PendingUserResponse {
    pub user_name: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordBody {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub user_name: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
}

// --- Health ---

/// GET /health
///
/// Unauthenticated. 503 when the store is not usable.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let (status, detail) = match state.desk.health().await {
        Ok(HealthStatus::Healthy) => ("ok", None),
        Ok(HealthStatus::Degraded(reason)) => ("degraded", Some(reason)),
        Ok(HealthStatus::Unhealthy(reason)) => ("unhealthy", Some(reason)),
        Err(e) => ("unhealthy", Some(e.to_string())),
    };
    let code = if status == "unhealthy" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    let body = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started.elapsed().as_secs(),
        detail,
    };
    (code, Json(body)).into_response()
}

// --- Login ---

/// POST /v1/login
pub async fn post_login(
    State(state): State<GatewayState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let identity = state
        .desk
        .accounts
        .authenticate(&body.user_name, &body.password)
        .await?;
    let token = state.sessions.create(identity.clone());
    Ok(Json(LoginResponse {
        token,
        user: identity,
    }))
}

/// GET /v1/login
///
/// The identity snapshot of the current session.
pub async fn get_login(Extension(session): Extension<AuthSession>) -> Json<IdentityContext> {
    Json(session.identity)
}

/// DELETE /v1/login
pub async fn delete_login(
    State(state): State<GatewayState>,
    Extension(session): Extension<AuthSession>,
) -> StatusCode {
    state.sessions.remove(&session.token);
    tracing::debug!(user_id = %session.identity.user_id, "logout");
    StatusCode::NO_CONTENT
}

// --- Cases ---

/// GET /v1/cases
pub async fn list_cases(
    State(state): State<GatewayState>,
    Extension(_session): Extension<AuthSession>,
) -> ApiResult<Json<Vec<Case>>> {
    Ok(Json(state.desk.cases.list_cases().await?))
}

/// POST /v1/cases
///
/// Public: customers open cases without an account.
pub async fn create_case(
    State(state): State<GatewayState>,
    ApiJson(body): ApiJson<CreateCaseRequest>,
) -> ApiResult<(StatusCode, Json<CreateCaseResponse>)> {
    let (case, _) = state
        .desk
        .cases
        .create_case(body.case, &body.message.text)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateCaseResponse {
            case_id: case.id,
            chat_token: case.chat_token,
        }),
    ))
}

// --- Customer chat ---

/// GET /v1/chat/case/{token}
pub async fn customer_chat(
    State(state): State<GatewayState>,
    ApiPath(token): ApiPath<String>,
) -> ApiResult<Json<ChatView>> {
    Ok(Json(state.desk.chat.customer_view(&token).await?))
}

/// POST /v1/chat/case/{token}/messages
pub async fn customer_post_message(
    State(state): State<GatewayState>,
    ApiPath(token): ApiPath<String>,
    ApiJson(body): ApiJson<MessageBody>,
) -> ApiResult<(StatusCode, Json<Message>)> {
    let message = state
        .desk
        .chat
        .post_customer_message(&token, &body.text)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

// --- Back-office chat ---

/// GET /v1/chat/backoffice/{id}
pub async fn agent_chat(
    State(state): State<GatewayState>,
    Extension(_session): Extension<AuthSession>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<ChatView>> {
    Ok(Json(state.desk.chat.agent_view(CaseId(id)).await?))
}

/// POST /v1/chat/backoffice/{id}/messages
pub async fn agent_post_message(
    State(state): State<GatewayState>,
    Extension(session): Extension<AuthSession>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<MessageBody>,
) -> ApiResult<(StatusCode, Json<Message>)> {
    let message = state
        .desk
        .chat
        .post_agent_message(&session.identity, CaseId(id), &body.text)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// PATCH /v1/chat/backoffice/{id}/close
pub async fn close_case(
    State(state): State<GatewayState>,
    Extension(session): Extension<AuthSession>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Case>> {
    let case = state.desk.cases.close_case(CaseId(id)).await?;
    tracing::debug!(case_id = id, user_id = %session.identity.user_id, "close requested");
    Ok(Json(case))
}

/// PATCH /v1/chat/backoffice/{id}/open
pub async fn open_case(
    State(state): State<GatewayState>,
    Extension(_session): Extension<AuthSession>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Case>> {
    Ok(Json(state.desk.cases.open_case(CaseId(id)).await?))
}

/// PATCH /v1/chat/backoffice/{id}/assign
///
/// An empty body claims the case for the caller.
pub async fn assign_case(
    State(state): State<GatewayState>,
    Extension(session): Extension<AuthSession>,
    ApiPath(id): ApiPath<i64>,
    body: Bytes,
) -> ApiResult<Json<Case>> {
    let request: AssignRequest = if body.iter().all(u8::is_ascii_whitespace) {
        AssignRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| CasebookError::Validation(format!("invalid assign body: {e}")))?
    };
    let handler = request.handler_id.unwrap_or(session.identity.user_id);
    let case = state
        .desk
        .cases
        .assign_handler(&session.identity, CaseId(id), handler)
        .await?;
    Ok(Json(case))
}

// --- Users ---

/// GET /v1/users
pub async fn list_users(
    State(state): State<GatewayState>,
    Extension(session): Extension<AuthSession>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.desk.accounts.list_users(&session.identity).await?))
}

/// POST /v1/users
///
/// Invite a user. The register token is returned so an admin can pass it on
/// when email is not configured.
pub async fn invite_user(
    State(state): State<GatewayState>,
    Extension(session): Extension<AuthSession>,
    ApiJson(body): ApiJson<InviteRequest>,
) -> ApiResult<(StatusCode, Json<InviteResponse>)> {
    let (user, register_token) = state
        .desk
        .registration
        .invite(&session.identity, body)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(InviteResponse {
            user,
            register_token,
        }),
    ))
}

/// PATCH /v1/users/{id}
pub async fn update_user(
    State(state): State<GatewayState>,
    Extension(session): Extension<AuthSession>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<UserPatch>,
) -> ApiResult<Json<User>> {
    let user = state
        .desk
        .accounts
        .update_user(&session.identity, UserId(id), body)
        .await?;
    Ok(Json(user))
}

/// DELETE /v1/users/{id}
pub async fn delete_user(
    State(state): State<GatewayState>,
    Extension(session): Extension<AuthSession>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    state
        .desk
        .accounts
        .delete_user(&session.identity, UserId(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/users/{id}/cases
///
/// Agents see their own cases; admins see anyone's.
pub async fn cases_for_user(
    State(state): State<GatewayState>,
    Extension(session): Extension<AuthSession>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Vec<Case>>> {
    let handler = UserId(id);
    if handler != session.identity.user_id {
        session.identity.require_admin()?;
    }
    Ok(Json(state.desk.cases.list_cases_for_handler(handler).await?))
}

// --- Registration ---

/// GET /v1/register/{token}
pub async fn lookup_registration(
    State(state): State<GatewayState>,
    ApiPath(token): ApiPath<String>,
) -> ApiResult<Json<PendingUserResponse>> {
    let user_name = state.desk.registration.lookup_pending(&token).await?;
    Ok(Json(PendingUserResponse { user_name }))
}

/// POST /v1/register/{token}
pub async fn register_by_token(
    State(state): State<GatewayState>,
    ApiPath(token): ApiPath<String>,
    ApiJson(body): ApiJson<PasswordBody>,
) -> ApiResult<StatusCode> {
    state
        .desk
        .registration
        .complete_registration_by_token(&token, &body.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/register
pub async fn register_by_name(
    State(state): State<GatewayState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<StatusCode> {
    state
        .desk
        .registration
        .complete_registration(&body.user_name, &body.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fallback for unknown routes, so every error body has the same shape.
pub async fn not_found() -> ApiError {
    ApiError(CasebookError::NotFound)
}
