//! Site settings routes.

use axum::{extract::State, Json};
use domain::models::site_setting::{
    BatchUpsertSettingsRequest, SettingKeyQuery, SettingUpsert, SettingsQuery, SettingsResponse,
    UpsertSettingRequest,
};
use serde_json::{json, Value};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, AppQuery, Session};

/// Settings grouped by type, plus the raw rows.
///
/// GET /api/settings?type=
pub async fn list(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SettingsQuery>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let setting_type = query
        .setting_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let settings = state.repos.settings.list(setting_type).await?;
    Ok(Json(SettingsResponse::from(settings)))
}

/// Insert or replace one setting.
///
/// POST /api/settings
pub async fn upsert(
    State(state): State<AppState>,
    session: Session,
    AppJson(request): AppJson<UpsertSettingRequest>,
) -> Result<Json<Value>, ApiError> {
    request.validate()?;

    let setting = state
        .repos
        .settings
        .upsert(SettingUpsert::from(request))
        .await?;

    info!(
        setting_type = %setting.setting_type,
        key = %setting.key,
        user_id = %session.user_id,
        "Setting saved"
    );

    Ok(Json(json!({ "setting": setting })))
}

/// Insert or replace several settings atomically.
///
/// PUT /api/settings
pub async fn upsert_batch(
    State(state): State<AppState>,
    session: Session,
    AppJson(request): AppJson<BatchUpsertSettingsRequest>,
) -> Result<Json<Value>, ApiError> {
    if request.settings.is_empty() {
        return Err(ApiError::Validation("settings must not be empty".into()));
    }
    for setting in &request.settings {
        setting.validate()?;
    }

    let upserts: Vec<SettingUpsert> = request.settings.into_iter().map(Into::into).collect();
    let results = state.repos.settings.upsert_many(upserts).await?;

    info!(count = results.len(), user_id = %session.user_id, "Settings saved");

    Ok(Json(json!({
        "success": true,
        "count": results.len(),
        "results": results
    })))
}

/// DELETE /api/settings?type=&key=
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    AppQuery(query): AppQuery<SettingKeyQuery>,
) -> Result<Json<Value>, ApiError> {
    let (Some(setting_type), Some(key)) = (query.setting_type, query.key) else {
        return Err(ApiError::Validation("type and key are required".into()));
    };

    if !state.repos.settings.delete(&setting_type, &key).await? {
        return Err(ApiError::NotFound("Setting not found".into()));
    }

    info!(
        setting_type = %setting_type,
        key = %key,
        user_id = %session.user_id,
        "Setting deleted"
    );

    Ok(Json(json!({ "success": true })))
}
