//! Authentication routes: credential login, session lookup and password reset.

use axum::{extract::State, Json};
use domain::models::user::{LoginRequest, LoginResponse, ResetPasswordRequest, UserResponse};
use serde_json::{json, Value};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, Session};
use crate::services::auth::AuthError;

/// Exchange email and password for a session token.
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;

    match state.auth.login(&request.email, &request.password).await {
        Ok(response) => Ok(Json(response)),
        Err(AuthError::InvalidCredentials) => {
            info!("Login rejected: invalid credentials");
            Err(AuthError::InvalidCredentials.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Current user for the presented token.
///
/// GET /api/auth/session
pub async fn session(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Value>, ApiError> {
    let user = state
        .repos
        .users
        .find_by_id(session.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Session user no longer exists".into()))?;

    Ok(Json(json!({ "user": UserResponse::from(user) })))
}

/// Set a password with an invitation or reset token.
///
/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(request): AppJson<ResetPasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    request.validate()?;

    state
        .auth
        .reset_password(&request.email, &request.token, &request.new_password)
        .await?;

    Ok(Json(json!({ "message": "Password has been set" })))
}
