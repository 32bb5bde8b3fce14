//! Project showcase routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::document::{DocumentListQuery, DocumentResponse};
use domain::models::ordering::{MoveRequest, ReindexRequest, SwapOutcome};
use domain::models::project::{
    CreateProjectRequest, Project, ProjectChanges, ProjectListQuery, ProjectResponse,
    ProjectSummary, UpdateProjectRequest,
};
use domain::repositories::{DocumentFilter, ProjectFilter};
use domain::services::ordering::first_duplicate;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, AppPath, AppQuery, OptionalSession, Session};

/// List active projects.
///
/// GET /api/projects?category=
pub async fn list_public(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProjectListQuery>,
) -> Result<Json<Value>, ApiError> {
    let projects = state
        .repos
        .projects
        .list(&ProjectFilter::public(query.category))
        .await?;

    Ok(Json(json!({ "projects": projects })))
}

/// Get one project with its documents.
///
/// GET /api/projects/:id
///
/// Inactive projects are only visible to signed-in staff.
pub async fn get(
    State(state): State<AppState>,
    OptionalSession(session): OptionalSession,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let project = state
        .repos
        .projects
        .find_by_id(id)
        .await?
        .filter(|p| p.is_active || session.is_some())
        .ok_or_else(|| ApiError::NotFound("Project not found".into()))?;

    let documents = state
        .repos
        .documents
        .list(&DocumentFilter::for_project(id, session.is_none()))
        .await?;

    let summary = ProjectSummary::from(&project);
    let documents = documents
        .into_iter()
        .map(|d| DocumentResponse::new(d, Some(summary.clone())))
        .collect();

    Ok(Json(json!({
        "project": ProjectResponse::with_documents(project, documents)
    })))
}

/// List every project with its documents.
///
/// GET /api/projects/admin?category=
pub async fn list_admin(
    State(state): State<AppState>,
    _session: Session,
    AppQuery(query): AppQuery<ProjectListQuery>,
) -> Result<Json<Value>, ApiError> {
    let projects = state
        .repos
        .projects
        .list(&ProjectFilter::admin(query.category))
        .await?;

    Ok(Json(json!({ "projects": with_documents(&state, projects).await? })))
}

async fn with_documents(
    state: &AppState,
    projects: Vec<Project>,
) -> Result<Vec<ProjectResponse>, ApiError> {
    let documents = state
        .repos
        .documents
        .list(&DocumentFilter::admin(DocumentListQuery::default()))
        .await?;

    let mut by_project: HashMap<Uuid, Vec<_>> = HashMap::new();
    for document in documents {
        if let Some(project_id) = document.project_id {
            by_project.entry(project_id).or_default().push(document);
        }
    }

    Ok(projects
        .into_iter()
        .map(|project| {
            let summary = ProjectSummary::from(&project);
            let documents = by_project
                .remove(&project.id)
                .unwrap_or_default()
                .into_iter()
                .map(|d| DocumentResponse::new(d, Some(summary.clone())))
                .collect();
            ProjectResponse::with_documents(project, documents)
        })
        .collect())
}

/// Create a project at the end of its category.
///
/// POST /api/projects/admin
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    AppJson(request): AppJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    request.validate()?;
    let new_project = request
        .into_new_project()
        .ok_or_else(|| ApiError::Validation("Category is required".into()))?;

    let project = state.repos.projects.create(new_project).await?;

    info!(
        project_id = %project.id,
        category = %project.category,
        order = project.order,
        user_id = %session.user_id,
        "Project created"
    );

    Ok((StatusCode::CREATED, Json(json!({ "project": project }))))
}

/// Partially update a project. Changing the category keeps the order value.
///
/// PUT /api/projects/:id
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<UpdateProjectRequest>,
) -> Result<Json<Value>, ApiError> {
    request.validate()?;

    let project = state
        .repos
        .projects
        .update(id, ProjectChanges::from(request))
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".into()))?;

    info!(project_id = %id, user_id = %session.user_id, "Project updated");

    Ok(Json(json!({ "project": project })))
}

/// Delete a project; its documents are kept and unlinked.
///
/// DELETE /api/projects/:id
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if !state.repos.projects.delete(id).await? {
        return Err(ApiError::NotFound("Project not found".into()));
    }

    info!(project_id = %id, user_id = %session.user_id, "Project deleted");

    Ok(Json(json!({ "success": true })))
}

/// Renumber projects in the submitted sequence.
///
/// POST /api/projects/reorder
pub async fn reorder(
    State(state): State<AppState>,
    session: Session,
    AppJson(request): AppJson<ReindexRequest>,
) -> Result<Json<Value>, ApiError> {
    let ids = request.ids();
    if ids.is_empty() {
        return Err(ApiError::Validation("items must not be empty".into()));
    }
    if let Some(duplicate) = first_duplicate(&ids) {
        return Err(ApiError::Validation(format!("Duplicate id in items: {}", duplicate)));
    }

    if let Some(category) = request.category {
        for id in &ids {
            let project = state
                .repos
                .projects
                .find_by_id(*id)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("Project {} not found", id)))?;
            if project.category != category {
                return Err(ApiError::Validation(format!(
                    "Project {} is not in category {}",
                    id, category
                )));
            }
        }
    }

    state.repos.projects.reindex(&ids).await?;

    info!(
        count = ids.len(),
        category = ?request.category,
        user_id = %session.user_id,
        "Projects reordered"
    );

    let projects = state
        .repos
        .projects
        .list(&ProjectFilter::admin(request.category))
        .await?;

    Ok(Json(json!({ "success": true, "projects": projects })))
}

/// Swap a project with its neighbour in the same category.
///
/// POST /api/projects/:id/move
pub async fn move_project(
    State(state): State<AppState>,
    session: Session,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<MoveRequest>,
) -> Result<Json<Value>, ApiError> {
    match state.repos.projects.swap_adjacent(id, request.direction).await? {
        SwapOutcome::Swapped { with } => {
            info!(
                project_id = %id,
                swapped_with = %with,
                direction = ?request.direction,
                user_id = %session.user_id,
                "Project moved"
            );
            Ok(Json(json!({
                "success": true,
                "message": "Project order updated",
                "swappedWith": with
            })))
        }
        SwapOutcome::Boundary => Err(ApiError::BoundaryReached),
        SwapOutcome::NotFound => Err(ApiError::NotFound("Project not found".into())),
    }
}
