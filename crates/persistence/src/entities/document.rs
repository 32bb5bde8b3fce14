//! Document entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::document::Document;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the documents table.
#[derive(Debug, Clone, FromRow)]
pub struct DocumentEntity {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_url: String,
    pub file_type: String,
    pub category: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub project_id: Option<Uuid>,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DocumentEntity> for Document {
    fn from(entity: DocumentEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            description: entity.description,
            file_url: entity.file_url,
            file_type: entity.file_type,
            category: entity.category,
            order: entity.sort_order,
            is_active: entity.is_active,
            project_id: entity.project_id,
            download_count: entity.download_count,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
