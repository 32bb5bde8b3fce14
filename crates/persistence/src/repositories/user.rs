//! User repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::user::{NewUser, User, UserChanges};
use domain::repositories::{RepoResult, UserRepository};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{UserEntity, UserRoleDb};
use crate::metrics::QueryTimer;

/// PostgreSQL-backed [`UserRepository`].
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Creates a new PgUserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn list(&self) -> RepoResult<Vec<User>> {
        let timer = QueryTimer::new("list_users");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, name, email, password_hash, role, reset_token_hash,
                   reset_token_expires_at, has_changed_password, created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();

        Ok(result?.into_iter().map(User::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, name, email, password_hash, role, reset_token_hash,
                   reset_token_expires_at, has_changed_password, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(result?.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, name, email, password_hash, role, reset_token_hash,
                   reset_token_expires_at, has_changed_password, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(result?.map(User::from))
    }

    async fn create(&self, user: NewUser) -> RepoResult<User> {
        let timer = QueryTimer::new("create_user");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, reset_token_hash,
                               reset_token_expires_at, has_changed_password)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, email, password_hash, role, reset_token_hash,
                      reset_token_expires_at, has_changed_password, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(UserRoleDb::from(user.role))
        .bind(&user.reset_token_hash)
        .bind(user.reset_token_expires_at)
        .bind(user.has_changed_password)
        .fetch_one(&self.pool)
        .await;
        timer.record();

        Ok(result?.into())
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> RepoResult<Option<User>> {
        let timer = QueryTimer::new("update_user");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                password_hash = COALESCE($5, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, password_hash, role, reset_token_hash,
                      reset_token_expires_at, has_changed_password, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.role.map(UserRoleDb::from))
        .bind(changes.password_hash)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(result?.map(User::from))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let timer = QueryTimer::new("delete_user");
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();

        Ok(result?.rows_affected() > 0)
    }

    async fn set_password(&self, id: Uuid, password_hash: &str, user_chosen: bool) -> RepoResult<bool> {
        let timer = QueryTimer::new("set_user_password");
        let result = sqlx::query(
            r#"
            UPDATE users SET
                password_hash = $2,
                has_changed_password = $3,
                reset_token_hash = NULL,
                reset_token_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .bind(user_chosen)
        .execute(&self.pool)
        .await;
        timer.record();

        Ok(result?.rows_affected() > 0)
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let timer = QueryTimer::new("set_user_reset_token");
        let result = sqlx::query(
            r#"
            UPDATE users SET
                reset_token_hash = $2,
                reset_token_expires_at = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await;
        timer.record();

        Ok(result?.rows_affected() > 0)
    }
}
