//! Contact form routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::contact::{
    ContactListQuery, ContactListResponse, ContactSubmission, CreateContactRequest,
    UpdateContactRequest,
};
use domain::models::user::IdQuery;
use domain::repositories::ContactFilter;
use serde_json::{json, Value};
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, AppQuery, Session};
use crate::middleware::metrics::{record_contact_submission, record_email};
use crate::routes::captcha::require_valid;
use crate::services::{email, notifications};

/// Store a public enquiry and notify staff.
///
/// POST /api/contacts
pub async fn submit(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateContactRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    request.validate()?;
    require_valid(&state, &request.captcha_id, &request.captcha).await?;

    let submission = state
        .repos
        .contacts
        .create(request.to_new_submission())
        .await?;
    record_contact_submission();

    info!(contact_id = %submission.id, "Contact submission received");

    notify_staff(&state, &submission).await;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": submission })),
    ))
}

/// Best-effort; failures are logged and never reach the submitter.
async fn notify_staff(state: &AppState, submission: &ContactSubmission) {
    let settings = state.repos.settings.as_ref();

    let receivers =
        match notifications::receivers(settings, &state.config.email.default_receiver).await {
            Ok(r) if !r.is_empty() => r,
            Ok(_) => {
                warn!(contact_id = %submission.id, "No notification receivers configured");
                return;
            }
            Err(e) => {
                warn!(contact_id = %submission.id, error = %e, "Failed to read notification receivers");
                return;
            }
        };

    let template = notifications::template(settings).await.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to read notification template, using default");
        None
    });

    let message = email::contact_notification(receivers, submission, template.as_deref());
    match state.mailer.send(&message).await {
        Ok(()) => record_email("contact", true),
        Err(e) => {
            record_email("contact", false);
            warn!(contact_id = %submission.id, error = %e, "Contact notification not sent");
        }
    }
}

/// Paged admin listing, newest first.
///
/// GET /api/contacts/admin?status=&from=&to=&q=&limit=&offset=
pub async fn list(
    State(state): State<AppState>,
    _session: Session,
    AppQuery(query): AppQuery<ContactListQuery>,
) -> Result<Json<ContactListResponse>, ApiError> {
    let filter = ContactFilter::from(query);
    let (data, total) = state.repos.contacts.list(&filter).await?;

    Ok(Json(ContactListResponse {
        data,
        total,
        limit: filter.window.limit,
        offset: filter.window.offset,
    }))
}

/// Update status or reply. Completing with a reply emails it to the submitter.
///
/// PATCH /api/contacts/admin
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    AppJson(request): AppJson<UpdateContactRequest>,
) -> Result<Json<Value>, ApiError> {
    request.validate()?;
    let (id, changes) = request.into_parts();
    let id = id.ok_or_else(|| ApiError::Validation("id is required".into()))?;

    let updated = state
        .repos
        .contacts
        .update(id, changes.clone())
        .await?
        .ok_or_else(|| ApiError::NotFound("Contact submission not found".into()))?;

    info!(
        contact_id = %id,
        status = %updated.status,
        user_id = %session.user_id,
        "Contact submission updated"
    );

    if changes.completes_with_reply(&updated) {
        if let Some(reply) = updated.non_empty_reply() {
            let message = email::contact_reply(&updated, reply, &state.config.email.sender_name);
            match state.mailer.send(&message).await {
                Ok(()) => {
                    record_email("reply", true);
                    info!(contact_id = %id, "Reply sent to submitter");
                }
                Err(e) => {
                    record_email("reply", false);
                    warn!(contact_id = %id, error = %e, "Reply email not sent");
                }
            }
        }
    }

    Ok(Json(json!({ "data": updated, "message": "Contact submission updated" })))
}

/// DELETE /api/contacts/admin?id=
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    AppQuery(query): AppQuery<IdQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = query
        .id
        .ok_or_else(|| ApiError::Validation("id is required".into()))?;

    if !state.repos.contacts.delete(id).await? {
        return Err(ApiError::NotFound("Contact submission not found".into()));
    }

    info!(contact_id = %id, user_id = %session.user_id, "Contact submission deleted");

    Ok(Json(json!({ "success": true })))
}
