//! Staff account management routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::user::{
    ChangePasswordRequest, CreateUserRequest, IdQuery, UpdateUserRequest, UserResponse,
};
use serde_json::{json, Value};
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AdminSession, AppJson, AppQuery, Session};
use crate::middleware::metrics::record_email;
use crate::services::auth::AccountUpdate;
use crate::services::email;

/// List staff accounts, newest first.
///
/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<Value>, ApiError> {
    let users: Vec<UserResponse> = state
        .repos
        .users
        .list()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(json!({ "data": users })))
}

/// Invite a user. The initial password is never returned; the invitee sets
/// their own through the emailed link.
///
/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    AppJson(request): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    request.validate()?;

    let invitation = state
        .auth
        .invite(&request.name, &request.email, request.role.unwrap_or_default())
        .await?;
    let user = invitation.user;

    let message = email::invitation(
        &user.name,
        &user.email,
        &invitation.link,
        &state.config.email.sender_name,
    );
    match state.mailer.send(&message).await {
        Ok(()) => record_email("invitation", true),
        Err(e) => {
            record_email("invitation", false);
            warn!(user_id = %user.id, error = %e, "Invitation email not sent");
        }
    }

    info!(user_id = %user.id, invited_by = %session.user_id, "User created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created", "data": UserResponse::from(user) })),
    ))
}

/// Edit a user addressed by `id` in the body.
///
/// PUT /api/users
pub async fn update(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    AppJson(request): AppJson<UpdateUserRequest>,
) -> Result<Json<Value>, ApiError> {
    request.validate()?;
    let id = request
        .id
        .ok_or_else(|| ApiError::Validation("id is required".into()))?;
    let role = request
        .role
        .ok_or_else(|| ApiError::Validation("Role is required".into()))?;

    let user = state
        .auth
        .update_account(
            id,
            AccountUpdate {
                name: request.name,
                email: request.email,
                role,
                password: request.password,
            },
        )
        .await?;

    info!(user_id = %id, updated_by = %session.user_id, "User updated");

    Ok(Json(json!({ "message": "User updated", "data": UserResponse::from(user) })))
}

/// DELETE /api/users?id=
pub async fn delete(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    AppQuery(query): AppQuery<IdQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = query
        .id
        .ok_or_else(|| ApiError::Validation("id is required".into()))?;

    if id == session.user_id {
        return Err(ApiError::Validation("You cannot delete your own account".into()));
    }

    if !state.repos.users.delete(id).await? {
        return Err(ApiError::NotFound("User not found".into()));
    }

    info!(user_id = %id, deleted_by = %session.user_id, "User deleted");

    Ok(Json(json!({ "message": "User deleted" })))
}

/// Change the signed-in user's own password.
///
/// POST /api/users/change-password
pub async fn change_password(
    State(state): State<AppState>,
    session: Session,
    AppJson(request): AppJson<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    request.validate()?;

    state
        .auth
        .change_password(session.user_id, &request.old_password, &request.new_password)
        .await?;

    Ok(Json(json!({ "message": "Password changed" })))
}
