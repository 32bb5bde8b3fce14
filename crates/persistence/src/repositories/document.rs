//! Document repository for database operations.

use async_trait::async_trait;
use domain::models::document::{Document, DocumentChanges, NewDocument};
use domain::repositories::{DocumentFilter, DocumentRepository, RepoResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::DocumentEntity;
use crate::metrics::QueryTimer;

/// PostgreSQL-backed [`DocumentRepository`].
#[derive(Clone)]
pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    /// Creates a new PgDocumentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn list(&self, filter: &DocumentFilter) -> RepoResult<Vec<Document>> {
        let timer = QueryTimer::new("list_documents");
        let result = sqlx::query_as::<_, DocumentEntity>(
            r#"
            SELECT id, title, description, file_url, file_type, category, sort_order,
                   is_active, project_id, download_count, created_at, updated_at
            FROM documents
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::uuid IS NULL OR project_id = $2)
              AND ($3 = FALSE OR is_active = TRUE)
            ORDER BY category, sort_order, created_at
            "#,
        )
        .bind(&filter.category)
        .bind(filter.project_id)
        .bind(filter.active_only)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        Ok(result?.into_iter().map(Document::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Document>> {
        let timer = QueryTimer::new("find_document_by_id");
        let result = sqlx::query_as::<_, DocumentEntity>(
            r#"
            SELECT id, title, description, file_url, file_type, category, sort_order,
                   is_active, project_id, download_count, created_at, updated_at
            FROM documents
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(result?.map(Document::from))
    }

    async fn create(&self, document: NewDocument) -> RepoResult<Document> {
        let timer = QueryTimer::new("create_document");
        let result = sqlx::query_as::<_, DocumentEntity>(
            r#"
            INSERT INTO documents (id, title, description, file_url, file_type, category,
                                   sort_order, is_active, project_id)
            SELECT $1, $2, $3, $4, $5, $6, COALESCE(MAX(sort_order), 0) + 1, $7, $8
            FROM documents
            WHERE category = $6
            RETURNING id, title, description, file_url, file_type, category, sort_order,
                      is_active, project_id, download_count, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&document.title)
        .bind(&document.description)
        .bind(&document.file_url)
        .bind(&document.file_type)
        .bind(&document.category)
        .bind(document.is_active)
        .bind(document.project_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();

        Ok(result?.into())
    }

    async fn update(&self, id: Uuid, changes: DocumentChanges) -> RepoResult<Option<Document>> {
        let timer = QueryTimer::new("update_document");
        let result = sqlx::query_as::<_, DocumentEntity>(
            r#"
            UPDATE documents SET
                title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                file_url = COALESCE($5, file_url),
                file_type = COALESCE($6, file_type),
                category = COALESCE($7, category),
                sort_order = COALESCE($8, sort_order),
                is_active = COALESCE($9, is_active),
                project_id = CASE WHEN $10 THEN $11 ELSE project_id END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, file_url, file_type, category, sort_order,
                      is_active, project_id, download_count, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(changes.description.is_some())
        .bind(changes.description.clone().flatten())
        .bind(&changes.file_url)
        .bind(&changes.file_type)
        .bind(&changes.category)
        .bind(changes.order)
        .bind(changes.is_active)
        .bind(changes.project_id.is_some())
        .bind(changes.project_id.flatten())
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(result?.map(Document::from))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let timer = QueryTimer::new("delete_document");
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();

        Ok(result?.rows_affected() > 0)
    }

    async fn record_download(&self, id: Uuid) -> RepoResult<Option<i64>> {
        let timer = QueryTimer::new("record_document_download");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE documents
            SET download_count = download_count + 1
            WHERE id = $1
            RETURNING download_count
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(result?)
    }
}
