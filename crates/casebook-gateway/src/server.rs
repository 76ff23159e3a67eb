// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::time::{Duration, Instant};

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use casebook_config::model::CasebookConfig;
use casebook_core::CasebookError;
use casebook_desk::Desk;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::require_session;
use crate::handlers;
use crate::session::SessionStore;

/// How often idle sessions are swept.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub desk: Desk,
    pub sessions: SessionStore,
    /// Process start, for uptime.
    pub started: Instant,
}

impl GatewayState {
    pub fn new(desk: Desk, sessions: SessionStore) -> Self {
        Self {
            desk,
            sessions,
            started: Instant::now(),
        }
    }
}

/// Bind address for the gateway.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_config(config: &CasebookConfig) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
        }
    }
}

/// Build the full route table.
///
/// Customer chat, case submission, registration and health are public. Every
/// other route needs a session; `/v1/login` and `/v1/cases` mix both.
pub fn router(state: GatewayState) -> Router {
    let auth = axum_middleware::from_fn_with_state(state.sessions.clone(), require_session);

    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/v1/chat/case/{token}", get(handlers::customer_chat))
        .route(
            "/v1/chat/case/{token}/messages",
            post(handlers::customer_post_message),
        )
        .route(
            "/v1/register/{token}",
            get(handlers::lookup_registration).post(handlers::register_by_token),
        )
        .route("/v1/register", post(handlers::register_by_name));

    let mixed_routes = Router::new()
        .route(
            "/v1/login",
            post(handlers::post_login).merge(
                get(handlers::get_login)
                    .delete(handlers::delete_login)
                    .route_layer(auth.clone()),
            ),
        )
        .route(
            "/v1/cases",
            post(handlers::create_case)
                .merge(get(handlers::list_cases).route_layer(auth.clone())),
        );

    let backoffice_routes = Router::new()
        .route("/v1/chat/backoffice/{id}", get(handlers::agent_chat))
        .route(
            "/v1/chat/backoffice/{id}/messages",
            post(handlers::agent_post_message),
        )
        .route("/v1/chat/backoffice/{id}/close", patch(handlers::close_case))
        .route("/v1/chat/backoffice/{id}/open", patch(handlers::open_case))
        .route("/v1/chat/backoffice/{id}/assign", patch(handlers::assign_case))
        .route(
            "/v1/users",
            get(handlers::list_users).post(handlers::invite_user),
        )
        .route(
            "/v1/users/{id}",
            patch(handlers::update_user).delete(handlers::delete_user),
        )
        .route("/v1/users/{id}/cases", get(handlers::cases_for_user))
        .route_layer(auth);

    Router::new()
        .merge(public_routes)
        .merge(mixed_routes)
        .merge(backoffice_routes)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve the gateway until `shutdown` fires.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), CasebookError> {
    state
        .sessions
        .spawn_reaper(SESSION_SWEEP_INTERVAL, shutdown.clone());
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CasebookError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| CasebookError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}
