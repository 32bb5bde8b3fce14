//! Project entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::project::{Project, ProjectCategory, ProjectDetails};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for project_category that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "project_category", rename_all = "lowercase")]
pub enum ProjectCategoryDb {
    New,
    Classic,
    Future,
}

impl From<ProjectCategoryDb> for ProjectCategory {
    fn from(db: ProjectCategoryDb) -> Self {
        match db {
            ProjectCategoryDb::New => ProjectCategory::New,
            ProjectCategoryDb::Classic => ProjectCategory::Classic,
            ProjectCategoryDb::Future => ProjectCategory::Future,
        }
    }
}

impl From<ProjectCategory> for ProjectCategoryDb {
    fn from(category: ProjectCategory) -> Self {
        match category {
            ProjectCategory::New => ProjectCategoryDb::New,
            ProjectCategory::Classic => ProjectCategoryDb::Classic,
            ProjectCategory::Future => ProjectCategoryDb::Future,
        }
    }
}

/// Database row mapping for the projects table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectEntity {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: ProjectCategoryDb,
    pub image_url: String,
    pub details: serde_json::Value,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProjectEntity> for Project {
    fn from(entity: ProjectEntity) -> Self {
        let details = serde_json::from_value::<ProjectDetails>(entity.details).unwrap_or_else(|e| {
            tracing::warn!(project_id = %entity.id, error = %e, "Unreadable project details, using empty");
            ProjectDetails::default()
        });

        Self {
            id: entity.id,
            title: entity.title,
            description: entity.description,
            category: entity.category.into(),
            image_url: entity.image_url,
            details,
            order: entity.sort_order,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
