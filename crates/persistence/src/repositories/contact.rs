//! Contact submission repository for database operations.

use async_trait::async_trait;
use domain::models::contact::{ContactChanges, ContactSubmission, NewContactSubmission};
use domain::repositories::{ContactFilter, ContactRepository, RepoResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ContactEntity, ContactPageRow, ContactStatusDb};
use crate::metrics::QueryTimer;

/// PostgreSQL-backed [`ContactRepository`].
#[derive(Clone)]
pub struct PgContactRepository {
    pool: PgPool,
}

impl PgContactRepository {
    /// Creates a new PgContactRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Counts matches when the requested window is past the last row,
    /// where the windowed query returns nothing to read the total from.
    async fn count(&self, filter: &ContactFilter) -> RepoResult<i64> {
        let timer = QueryTimer::new("count_contact_submissions");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM contact_submissions
            WHERE ($1::contact_status IS NULL OR status = $1)
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at < $3)
              AND ($4::text IS NULL
                   OR name ILIKE $4 ESCAPE '\'
                   OR email ILIKE $4 ESCAPE '\'
                   OR phone ILIKE $4 ESCAPE '\'
                   OR message ILIKE $4 ESCAPE '\')
            "#,
        )
        .bind(filter.status.map(ContactStatusDb::from))
        .bind(filter.created_from)
        .bind(filter.created_to)
        .bind(filter.search_pattern())
        .fetch_one(&self.pool)
        .await;
        timer.record();

        Ok(result?)
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    async fn create(&self, submission: NewContactSubmission) -> RepoResult<ContactSubmission> {
        let timer = QueryTimer::new("create_contact_submission");
        let result = sqlx::query_as::<_, ContactEntity>(
            r#"
            INSERT INTO contact_submissions (id, name, email, phone, message, privacy_agreed)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, phone, message, status, reply, privacy_agreed,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(&submission.phone)
        .bind(&submission.message)
        .bind(submission.privacy_agreed)
        .fetch_one(&self.pool)
        .await;
        timer.record();

        Ok(result?.into())
    }

    async fn list(&self, filter: &ContactFilter) -> RepoResult<(Vec<ContactSubmission>, i64)> {
        let timer = QueryTimer::new("list_contact_submissions");
        let result = sqlx::query_as::<_, ContactPageRow>(
            r#"
            SELECT id, name, email, phone, message, status, reply, privacy_agreed,
                   created_at, updated_at, COUNT(*) OVER () AS total_count
            FROM contact_submissions
            WHERE ($1::contact_status IS NULL OR status = $1)
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at < $3)
              AND ($4::text IS NULL
                   OR name ILIKE $4 ESCAPE '\'
                   OR email ILIKE $4 ESCAPE '\'
                   OR phone ILIKE $4 ESCAPE '\'
                   OR message ILIKE $4 ESCAPE '\')
            ORDER BY created_at DESC, id
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(filter.status.map(ContactStatusDb::from))
        .bind(filter.created_from)
        .bind(filter.created_to)
        .bind(filter.search_pattern())
        .bind(filter.window.limit)
        .bind(filter.window.offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        let rows = result?;
        let total = match rows.first() {
            Some(row) => row.total_count,
            None if filter.window.offset > 0 => self.count(filter).await?,
            None => 0,
        };

        Ok((
            rows.into_iter()
                .map(|row| ContactSubmission::from(row.contact))
                .collect(),
            total,
        ))
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<ContactSubmission>> {
        let timer = QueryTimer::new("find_contact_submission_by_id");
        let result = sqlx::query_as::<_, ContactEntity>(
            r#"
            SELECT id, name, email, phone, message, status, reply, privacy_agreed,
                   created_at, updated_at
            FROM contact_submissions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(result?.map(ContactSubmission::from))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: ContactChanges,
    ) -> RepoResult<Option<ContactSubmission>> {
        let timer = QueryTimer::new("update_contact_submission");
        let result = sqlx::query_as::<_, ContactEntity>(
            r#"
            UPDATE contact_submissions SET
                status = COALESCE($2, status),
                reply = COALESCE($3, reply),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, phone, message, status, reply, privacy_agreed,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.status.map(ContactStatusDb::from))
        .bind(changes.reply)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(result?.map(ContactSubmission::from))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let timer = QueryTimer::new("delete_contact_submission");
        let result = sqlx::query("DELETE FROM contact_submissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();

        Ok(result?.rows_affected() > 0)
    }
}
