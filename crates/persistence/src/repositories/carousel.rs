//! Carousel repository for database operations.

use async_trait::async_trait;
use domain::models::carousel::{CarouselChanges, CarouselItem, NewCarouselItem};
use domain::models::ordering::{MoveDirection, SwapOutcome};
use domain::repositories::{CarouselRepository, RepoResult, RepositoryError};
use domain::services::ordering::reindex_positions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{CarouselEntity, TextDirectionDb, TextPositionDb};
use crate::metrics::QueryTimer;

/// PostgreSQL-backed [`CarouselRepository`].
#[derive(Clone)]
pub struct PgCarouselRepository {
    pool: PgPool,
}

impl PgCarouselRepository {
    /// Creates a new PgCarouselRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CarouselRepository for PgCarouselRepository {
    async fn list(&self, active_only: bool) -> RepoResult<Vec<CarouselItem>> {
        let timer = QueryTimer::new("list_carousel_items");
        let result = sqlx::query_as::<_, CarouselEntity>(
            r#"
            SELECT id, title, image_url, link_url, link_text, description, sort_order,
                   is_active, text_position, text_direction, created_at, updated_at
            FROM carousel_items
            WHERE ($1 = FALSE OR is_active = TRUE)
            ORDER BY sort_order, created_at
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        Ok(result?.into_iter().map(CarouselItem::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<CarouselItem>> {
        let timer = QueryTimer::new("find_carousel_item_by_id");
        let result = sqlx::query_as::<_, CarouselEntity>(
            r#"
            SELECT id, title, image_url, link_url, link_text, description, sort_order,
                   is_active, text_position, text_direction, created_at, updated_at
            FROM carousel_items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(result?.map(CarouselItem::from))
    }

    async fn create(&self, item: NewCarouselItem) -> RepoResult<CarouselItem> {
        let timer = QueryTimer::new("create_carousel_item");
        let result = sqlx::query_as::<_, CarouselEntity>(
            r#"
            INSERT INTO carousel_items (id, title, image_url, link_url, link_text, description,
                                        sort_order, is_active, text_position, text_direction)
            SELECT $1, $2, $3, $4, $5, $6, COALESCE(MAX(sort_order), 0) + 1, $7, $8, $9
            FROM carousel_items
            RETURNING id, title, image_url, link_url, link_text, description, sort_order,
                      is_active, text_position, text_direction, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&item.title)
        .bind(&item.image_url)
        .bind(&item.link_url)
        .bind(&item.link_text)
        .bind(&item.description)
        .bind(item.is_active)
        .bind(TextPositionDb::from(item.text_position))
        .bind(TextDirectionDb::from(item.text_direction))
        .fetch_one(&self.pool)
        .await;
        timer.record();

        Ok(result?.into())
    }

    async fn update(&self, id: Uuid, changes: CarouselChanges) -> RepoResult<Option<CarouselItem>> {
        let timer = QueryTimer::new("update_carousel_item");
        let result = sqlx::query_as::<_, CarouselEntity>(
            r#"
            UPDATE carousel_items SET
                title = CASE WHEN $2 THEN $3 ELSE title END,
                image_url = COALESCE($4, image_url),
                link_url = CASE WHEN $5 THEN $6 ELSE link_url END,
                link_text = CASE WHEN $7 THEN $8 ELSE link_text END,
                description = CASE WHEN $9 THEN $10 ELSE description END,
                sort_order = COALESCE($11, sort_order),
                is_active = COALESCE($12, is_active),
                text_position = COALESCE($13, text_position),
                text_direction = COALESCE($14, text_direction),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, image_url, link_url, link_text, description, sort_order,
                      is_active, text_position, text_direction, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.title.is_some())
        .bind(changes.title.flatten())
        .bind(changes.image_url)
        .bind(changes.link_url.is_some())
        .bind(changes.link_url.flatten())
        .bind(changes.link_text.is_some())
        .bind(changes.link_text.flatten())
        .bind(changes.description.is_some())
        .bind(changes.description.flatten())
        .bind(changes.order)
        .bind(changes.is_active)
        .bind(changes.text_position.map(TextPositionDb::from))
        .bind(changes.text_direction.map(TextDirectionDb::from))
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(result?.map(CarouselItem::from))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let timer = QueryTimer::new("delete_carousel_item");
        let result = sqlx::query("DELETE FROM carousel_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();

        Ok(result?.rows_affected() > 0)
    }

    async fn reindex(&self, ids: &[Uuid]) -> RepoResult<()> {
        let timer = QueryTimer::new("reindex_carousel_items");
        let mut tx = self.pool.begin().await?;

        for (id, order) in reindex_positions(ids) {
            let affected = sqlx::query(
                "UPDATE carousel_items SET sort_order = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .bind(order)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if affected == 0 {
                return Err(RepositoryError::NotFound);
            }
        }

        tx.commit().await?;
        timer.record();
        Ok(())
    }

    async fn swap_adjacent(&self, id: Uuid, direction: MoveDirection) -> RepoResult<SwapOutcome> {
        let timer = QueryTimer::new("swap_carousel_order");
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_scalar::<_, i32>(
            "SELECT sort_order FROM carousel_items WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(order) = current else {
            return Ok(SwapOutcome::NotFound);
        };

        let neighbour_sql = match direction {
            MoveDirection::Up => {
                r#"
                SELECT id, sort_order FROM carousel_items
                WHERE sort_order < $1
                ORDER BY sort_order DESC
                LIMIT 1
                FOR UPDATE
                "#
            }
            MoveDirection::Down => {
                r#"
                SELECT id, sort_order FROM carousel_items
                WHERE sort_order > $1
                ORDER BY sort_order ASC
                LIMIT 1
                FOR UPDATE
                "#
            }
        };

        let neighbour = sqlx::query_as::<_, (Uuid, i32)>(neighbour_sql)
            .bind(order)
            .fetch_optional(&mut *tx)
            .await?;

        let Some((neighbour_id, neighbour_order)) = neighbour else {
            return Ok(SwapOutcome::Boundary);
        };

        for (target, new_order) in [(id, neighbour_order), (neighbour_id, order)] {
            sqlx::query("UPDATE carousel_items SET sort_order = $2, updated_at = NOW() WHERE id = $1")
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
