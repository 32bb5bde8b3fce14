//! Homepage carousel routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::carousel::{
    CarouselChanges, CreateCarouselRequest, NewCarouselItem, UpdateCarouselRequest,
};
use domain::models::ordering::{ReindexRequest, SwapOutcome, SwapRequest};
use domain::services::ordering::first_duplicate;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, AppPath, Session};

/// List active slides.
///
/// GET /api/carousel
pub async fn list_public(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let items = state.repos.carousel.list(true).await?;
    Ok(Json(json!({ "carouselItems": items })))
}

/// List every slide.
///
/// GET /api/carousel/admin
pub async fn list_admin(
    State(state): State<AppState>,
    _session: Session,
) -> Result<Json<Value>, ApiError> {
    let items = state.repos.carousel.list(false).await?;
    Ok(Json(json!({ "carouselItems": items })))
}

/// GET /api/carousel/:id
pub async fn get(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let item = state
        .repos
        .carousel
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Carousel item not found".into()))?;

    Ok(Json(json!({ "carouselItem": item })))
}

/// Append a slide.
///
/// POST /api/carousel
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    AppJson(request): AppJson<CreateCarouselRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    request.validate()?;

    let item = state
        .repos
        .carousel
        .create(NewCarouselItem::from(request))
        .await?;

    info!(
        carousel_id = %item.id,
        order = item.order,
        user_id = %session.user_id,
        "Carousel item created"
    );

    Ok((StatusCode::CREATED, Json(json!({ "carousel": item }))))
}

/// Partially update a slide.
///
/// PATCH /api/carousel/:id
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<UpdateCarouselRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut errors = match request.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };
    if let Err(e) = request.validate_link() {
        errors.add("link_url", e);
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let item = state
        .repos
        .carousel
        .update(id, CarouselChanges::from(request))
        .await?
        .ok_or_else(|| ApiError::NotFound("Carousel item not found".into()))?;

    info!(carousel_id = %id, user_id = %session.user_id, "Carousel item updated");

    Ok(Json(json!({ "carousel": item })))
}

/// DELETE /api/carousel/:id
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if !state.repos.carousel.delete(id).await? {
        return Err(ApiError::NotFound("Carousel item not found".into()));
    }

    info!(carousel_id = %id, user_id = %session.user_id, "Carousel item deleted");

    Ok(Json(json!({ "message": "Carousel item deleted" })))
}

/// Swap a slide with its neighbour.
///
/// POST /api/carousel/reorder
pub async fn swap(
    State(state): State<AppState>,
    session: Session,
    AppJson(request): AppJson<SwapRequest>,
) -> Result<Json<Value>, ApiError> {
    match state
        .repos
        .carousel
        .swap_adjacent(request.id, request.direction)
        .await?
    {
        SwapOutcome::Swapped { with } => {
            info!(
                carousel_id = %request.id,
                swapped_with = %with,
                direction = ?request.direction,
                user_id = %session.user_id,
                "Carousel item moved"
            );
            Ok(Json(json!({ "success": true, "message": "Carousel order updated" })))
        }
        SwapOutcome::Boundary => Err(ApiError::BoundaryReached),
        SwapOutcome::NotFound => Err(ApiError::NotFound("Carousel item not found".into())),
    }
}

/// Renumber slides in the submitted sequence.
///
/// PUT /api/carousel/reorder
pub async fn reindex(
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

    state.repos.carousel.reindex(&ids).await?;

    info!(count = ids.len(), user_id = %session.user_id, "Carousel reordered");

    let items = state.repos.carousel.list(false).await?;
    Ok(Json(json!({ "success": true, "carouselItems": items })))
}
