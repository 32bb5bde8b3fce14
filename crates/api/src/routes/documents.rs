//! Downloadable document routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::document::{
    CreateDocumentRequest, Document, DocumentListQuery, DocumentResponse, DownloadResponse,
    NewDocument, UpdateDocumentRequest,
};
use domain::models::user::IdQuery;
use domain::repositories::DocumentFilter;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, AppPath, AppQuery, OptionalSession, Session};

/// Pairs each document with its linked project's summary.
async fn attach_projects(
    state: &AppState,
    documents: Vec<Document>,
) -> Result<Vec<DocumentResponse>, ApiError> {
    let mut ids: Vec<Uuid> = documents.iter().filter_map(|d| d.project_id).collect();
    ids.sort();
    ids.dedup();

    let summaries: HashMap<Uuid, _> = if ids.is_empty() {
        HashMap::new()
    } else {
        state
            .repos
            .projects
            .summaries(&ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect()
    };

    Ok(documents
        .into_iter()
        .map(|d| {
            let project = d.project_id.and_then(|id| summaries.get(&id).cloned());
            DocumentResponse::new(d, project)
        })
        .collect())
}

async fn ensure_project_exists(state: &AppState, project_id: Uuid) -> Result<(), ApiError> {
    match state.repos.projects.find_by_id(project_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound("Project not found".into())),
    }
}

/// List active documents.
///
/// GET /api/documents?category=&projectId=
pub async fn list_public(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<DocumentListQuery>,
) -> Result<Json<Value>, ApiError> {
    let documents = state
        .repos
        .documents
        .list(&DocumentFilter::public(query))
        .await?;

    Ok(Json(json!({ "documents": attach_projects(&state, documents).await? })))
}

/// Get one document.
///
/// GET /api/documents/:id
///
/// Inactive documents are forbidden unless the caller is signed in.
pub async fn get(
    State(state): State<AppState>,
    OptionalSession(session): OptionalSession,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let document = state
        .repos
        .documents
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Document not found".into()))?;

    if !document.is_active && session.is_none() {
        return Err(ApiError::Forbidden("Document is not available".into()));
    }

    let mut responses = attach_projects(&state, vec![document]).await?;
    Ok(Json(json!({ "document": responses.pop() })))
}

/// Record a download and return the file URL.
///
/// POST /api/documents/:id/download
///
/// Counting is best-effort: on failure the URL is still returned.
pub async fn download(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<DownloadResponse>, ApiError> {
    let document = state
        .repos
        .documents
        .find_by_id(id)
        .await?
        .filter(|d| d.is_active)
        .ok_or_else(|| ApiError::NotFound("Document not found".into()))?;

    let download_count = match state.repos.documents.record_download(id).await {
        Ok(count) => count,
        Err(e) => {
            warn!(document_id = %id, error = %e, "Failed to record download");
            None
        }
    };

    Ok(Json(DownloadResponse {
        file_url: document.file_url,
        download_count,
    }))
}

/// List every document.
///
/// GET /api/documents/admin?category=&projectId=
pub async fn list_admin(
    State(state): State<AppState>,
    _session: Session,
    AppQuery(query): AppQuery<DocumentListQuery>,
) -> Result<Json<Value>, ApiError> {
    let documents = state
        .repos
        .documents
        .list(&DocumentFilter::admin(query))
        .await?;

    Ok(Json(json!({ "documents": attach_projects(&state, documents).await? })))
}

/// Create a document at the end of its category.
///
/// POST /api/documents/admin
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    AppJson(request): AppJson<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    request.validate()?;
    if let Some(project_id) = request.project_id {
        ensure_project_exists(&state, project_id).await?;
    }

    let document = state
        .repos
        .documents
        .create(NewDocument::from(request))
        .await?;

    info!(
        document_id = %document.id,
        category = %document.category,
        user_id = %session.user_id,
        "Document created"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "document": document, "message": "Document created" })),
    ))
}

/// Partially update a document addressed by `id` in the body.
///
/// PATCH /api/documents/admin
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    AppJson(request): AppJson<UpdateDocumentRequest>,
) -> Result<Json<Value>, ApiError> {
    request.validate()?;
    let (id, changes) = request.into_parts();
    let id = id.ok_or_else(|| ApiError::Validation("id is required".into()))?;

    if let Some(Some(project_id)) = changes.project_id {
        ensure_project_exists(&state, project_id).await?;
    }

    let document = state
        .repos
        .documents
        .update(id, changes)
        .await?
        .ok_or_else(|| ApiError::NotFound("Document not found".into()))?;

    info!(document_id = %id, user_id = %session.user_id, "Document updated");

    Ok(Json(json!({ "document": document, "message": "Document updated" })))
}

/// Delete a document.
///
/// DELETE /api/documents/admin?id=
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    AppQuery(query): AppQuery<IdQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = query
        .id
        .ok_or_else(|| ApiError::Validation("id is required".into()))?;

    if !state.repos.documents.delete(id).await? {
        return Err(ApiError::NotFound("Document not found".into()));
    }

    info!(document_id = %id, user_id = %session.user_id, "Document deleted");

    Ok(Json(json!({ "success": true, "message": "Document deleted" })))
}
