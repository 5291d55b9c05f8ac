//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for login and logout.

use crate::error::reject;
use crate::web::{rest::SessionView, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use doc_chat_core::LoginOutcome;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/login - Log in to the session
///
/// The user app ignores a refused login: the response is still 200 and the
/// returned state simply stays unauthenticated.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login processed", body = SessionView),
        (status = 401, description = "Invalid admin credentials"),
        (status = 409, description = "Already logged in")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionView>, (StatusCode, String)> {
    let outcome = state
        .session
        .login(&req.username, &req.password)
        .await
        .map_err(reject)?;

    if outcome == LoginOutcome::Ignored {
        info!("Login attempt ignored.");
    }

    Ok(Json(state.session.snapshot().await.into()))
}

/// POST /auth/logout - Log out and clear the chat
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful", body = SessionView),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionView>, (StatusCode, String)> {
    state.session.logout().await.map_err(reject)?;
    Ok(Json(state.session.snapshot().await.into()))
}
