//! File upload proxy to object storage.

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppQuery, Session};
use crate::middleware::metrics::record_upload;
use crate::services::blob_storage::{
    content_type_for, object_path, sanitize_filename, BlobError, StoredBlob,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadQuery {
    pub filename: Option<String>,
}

struct FilePart {
    content_type: Option<String>,
    bytes: Bytes,
}

fn multipart_error(err: MultipartError, limit: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        BlobError::TooLarge { limit }.into()
    } else {
        ApiError::Validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}

/// Store the multipart `file` field and return its public URL.
///
/// POST /api/upload?filename=
pub async fn upload(
    State(state): State<AppState>,
    session: Session,
    AppQuery(query): AppQuery<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Json<StoredBlob>, ApiError> {
    let limit = state.config.storage.max_upload_bytes;

    let filename = query
        .filename
        .as_deref()
        .and_then(sanitize_filename)
        .ok_or_else(|| ApiError::Validation("filename is required".into()))?;

    let mut file: Option<FilePart> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        file = Some(FilePart { content_type, bytes });
    }

    let file = file.ok_or_else(|| ApiError::Validation("file is required".into()))?;
    if file.bytes.len() > limit {
        return Err(BlobError::TooLarge { limit }.into());
    }

    let content_type = content_type_for(file.content_type.as_deref(), &filename);
    let pathname = object_path(&filename);
    let size = file.bytes.len();

    let stored = state
        .blob_store
        .put(&pathname, &content_type, file.bytes)
        .await?;
    record_upload(size);

    info!(
        pathname = %stored.pathname,
        size,
        content_type = %stored.content_type,
        user_id = %session.user_id,
        "File uploaded"
    );

    Ok(Json(stored))
}
