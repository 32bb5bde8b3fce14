//! CAPTCHA challenge routes.

use axum::{extract::State, Json};
use domain::models::captcha::CaptchaResponse;
use tracing::{debug, info};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_captcha_verification;
use crate::services::captcha_image;

/// Issue a challenge and its rendered image.
///
/// GET /api/captcha
pub async fn issue(State(state): State<AppState>) -> Result<Json<CaptchaResponse>, ApiError> {
    let issued = state.captcha.issue().await?;
    let captcha_image = captcha_image::render_data_url(&issued.code)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    debug!(captcha_id = %issued.id, expires_at = %issued.expires_at, "Captcha issued");

    let code = state.config.captcha.expose_code.then_some(issued.code);

    Ok(Json(CaptchaResponse {
        success: true,
        captcha_id: issued.id,
        captcha_image,
        code,
    }))
}

/// Consumes the challenge and rejects the request unless the answer matched.
pub(crate) async fn require_valid(
    state: &AppState,
    captcha_id: &str,
    answer: &str,
) -> Result<(), ApiError> {
    let passed = state.captcha.verify_str(captcha_id, answer).await?;
    record_captcha_verification(passed);

    if !passed {
        info!(captcha_id = %captcha_id, "Captcha verification failed");
        return Err(ApiError::Validation("invalid captcha".into()));
    }
    Ok(())
}
