//! Project repository for database operations.

use async_trait::async_trait;
use domain::models::ordering::{MoveDirection, SwapOutcome};
use domain::models::project::{NewProject, Project, ProjectChanges, ProjectSummary};
use domain::repositories::{ProjectFilter, ProjectRepository, RepoResult, RepositoryError};
use domain::services::ordering::reindex_positions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ProjectCategoryDb, ProjectEntity};
use crate::metrics::QueryTimer;

/// PostgreSQL-backed [`ProjectRepository`].
#[derive(Clone)]
pub struct PgProjectRepository {
    pool: PgPool,
}

impl PgProjectRepository {
    /// Creates a new PgProjectRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn list(&self, filter: &ProjectFilter) -> RepoResult<Vec<Project>> {
        let timer = QueryTimer::new("list_projects");
        let result = sqlx::query_as::<_, ProjectEntity>(
            r#"
            SELECT id, title, description, category, image_url, details,
                   sort_order, is_active, created_at, updated_at
            FROM projects
            WHERE ($1::project_category IS NULL OR category = $1)
              AND ($2 = FALSE OR is_active = TRUE)
            ORDER BY category, sort_order, created_at
            "#,
        )
        .bind(filter.category.map(ProjectCategoryDb::from))
        .bind(filter.active_only)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        Ok(result?.into_iter().map(Project::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Project>> {
        let timer = QueryTimer::new("find_project_by_id");
        let result = sqlx::query_as::<_, ProjectEntity>(
            r#"
            SELECT id, title, description, category, image_url, details,
                   sort_order, is_active, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(result?.map(Project::from))
    }

    async fn summaries(&self, ids: &[Uuid]) -> RepoResult<Vec<ProjectSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let timer = QueryTimer::new("project_summaries");
        let result = sqlx::query_as::<_, (Uuid, String, String)>(
            r#"
            SELECT id, title, image_url
            FROM projects
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        Ok(result?
            .into_iter()
            .map(|(id, title, image_url)| ProjectSummary { id, title, image_url })
            .collect())
    }

    async fn create(&self, project: NewProject) -> RepoResult<Project> {
        let details = serde_json::to_value(&project.details)
            .map_err(|e| RepositoryError::Database(format!("details encoding: {}", e)))?;

        let timer = QueryTimer::new("create_project");
        let result = sqlx::query_as::<_, ProjectEntity>(
            r#"
            INSERT INTO projects (id, title, description, category, image_url, details, sort_order, is_active)
            SELECT $1, $2, $3, $4, $5, $6, COALESCE(MAX(sort_order), 0) + 1, $7
            FROM projects
            WHERE category = $4
            RETURNING id, title, description, category, image_url, details,
                      sort_order, is_active, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&project.title)
        .bind(&project.description)
        .bind(ProjectCategoryDb::from(project.category))
        .bind(&project.image_url)
        .bind(details)
        .bind(project.is_active)
        .fetch_one(&self.pool)
        .await;
        timer.record();

        Ok(result?.into())
    }

    async fn update(&self, id: Uuid, changes: ProjectChanges) -> RepoResult<Option<Project>> {
        let details = changes
            .details
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| RepositoryError::Database(format!("details encoding: {}", e)))?;

        let timer = QueryTimer::new("update_project");
        let result = sqlx::query_as::<_, ProjectEntity>(
            r#"
            UPDATE projects SET
                title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                category = COALESCE($5, category),
                image_url = COALESCE($6, image_url),
                details = COALESCE($7, details),
                sort_order = COALESCE($8, sort_order),
                is_active = COALESCE($9, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, category, image_url, details,
                      sort_order, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(changes.description.is_some())
        .bind(changes.description.flatten())
        .bind(changes.category.map(ProjectCategoryDb::from))
        .bind(&changes.image_url)
        .bind(details)
        .bind(changes.order)
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(result?.map(Project::from))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let timer = QueryTimer::new("delete_project");
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE documents SET project_id = NULL, updated_at = NOW() WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        timer.record();

        Ok(deleted > 0)
    }

    async fn reindex(&self, ids: &[Uuid]) -> RepoResult<()> {
        let timer = QueryTimer::new("reindex_projects");
        let mut tx = self.pool.begin().await?;

        for (id, order) in reindex_positions(ids) {
            let affected = sqlx::query(
                "UPDATE projects SET sort_order = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .bind(order)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if affected == 0 {
                // Dropping the transaction rolls back earlier updates.
                return Err(RepositoryError::NotFound);
            }
        }

        tx.commit().await?;
        timer.record();
        Ok(())
    }

    async fn swap_adjacent(&self, id: Uuid, direction: MoveDirection) -> RepoResult<SwapOutcome> {
        let timer = QueryTimer::new("swap_project_order");
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, (ProjectCategoryDb, i32)>(
            "SELECT category, sort_order FROM projects WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((category, order)) = current else {
            return Ok(SwapOutcome::NotFound);
        };

        let neighbour_sql = match direction {
            MoveDirection::Up => {
                r#"
                SELECT id, sort_order FROM projects
                WHERE category = $1 AND sort_order < $2
                ORDER BY sort_order DESC
                LIMIT 1
                FOR UPDATE
                "#
            }
            MoveDirection::Down => {
                r#"
                SELECT id, sort_order FROM projects
                WHERE category = $1 AND sort_order > $2
                ORDER BY sort_order ASC
                LIMIT 1
                FOR UPDATE
                "#
            }
        };

        let neighbour = sqlx::query_as::<_, (Uuid, i32)>(neighbour_sql)
            .bind(category)
            .bind(order)
            .fetch_optional(&mut *tx)
            .await?;

        let Some((neighbour_id, neighbour_order)) = neighbour else {
            return Ok(SwapOutcome::Boundary);
        };

        for (target, new_order) in [(id, neighbour_order), (neighbour_id, order)] {
            sqlx::query("UPDATE projects SET sort_order = $2, updated_at = NOW() WHERE id = $1")
                .bind(target)
                .bind(new_order)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        timer.record();

        Ok(SwapOutcome::Swapped { with: neighbour_id })
    }
}
