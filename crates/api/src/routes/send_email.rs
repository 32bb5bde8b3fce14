//! Free-form email relay from the public site.

use axum::{extract::State, Json};
use domain::models::mail::{SendEmailRequest, SendEmailResponse};
use domain::services::{render_template, TemplateVars};
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AppJson;
use crate::middleware::metrics::record_email;
use crate::routes::captcha::require_valid;
use crate::services::email::{EmailError, EmailMessage};
use crate::services::notifications;

/// Relay a visitor message to the configured receivers.
///
/// POST /api/send-email
pub async fn send(
    State(state): State<AppState>,
    AppJson(request): AppJson<SendEmailRequest>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    request.validate()?;
    require_valid(&state, &request.captcha_id, &request.captcha).await?;

    let settings = state.repos.settings.as_ref();
    let receivers =
        notifications::receivers(settings, &state.config.email.default_receiver).await?;
    if receivers.is_empty() {
        return Err(EmailError::NotConfigured("no receivers configured".into()).into());
    }

    let body_text = match notifications::template(settings).await? {
        Some(template) => render_template(
            &template,
            &TemplateVars {
                name: request.name.as_deref().unwrap_or_default(),
                email: request.email.as_deref().unwrap_or_default(),
                phone: request.phone.as_deref().unwrap_or_default(),
                message: &request.body,
            },
        ),
        None => request.body.clone(),
    };

    let message = EmailMessage {
        to: receivers,
        subject: request.subject.trim().to_string(),
        body_text,
        body_html: None,
    };

    if let Err(e) = state.mailer.send(&message).await {
        record_email("relay", false);
        warn!(error = %e, "Relay email not sent");
        return Err(e.into());
    }
    record_email("relay", true);

    info!(recipients = message.to.len(), "Relay email sent");

    Ok(Json(SendEmailResponse {
        success: true,
        message: "Email sent".into(),
    }))
}
