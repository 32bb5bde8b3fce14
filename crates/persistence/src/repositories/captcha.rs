//! Captcha challenge store and database health probe.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::captcha::CaptchaChallenge;
use domain::repositories::{CaptchaStore, HealthProbe, RepoResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::CaptchaEntity;
use crate::metrics::QueryTimer;

/// Challenges in a table, so every instance behind a load balancer
/// can verify what another issued.
#[derive(Clone)]
pub struct PgCaptchaStore {
    pool: PgPool,
}

impl PgCaptchaStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CaptchaStore for PgCaptchaStore {
    async fn save(&self, challenge: &CaptchaChallenge) -> RepoResult<()> {
        let timer = QueryTimer::new("save_captcha");
        let result = sqlx::query(
            "INSERT INTO captcha_challenges (id, code, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(challenge.id)
        .bind(&challenge.code)
        .bind(challenge.expires_at)
        .execute(&self.pool)
        .await;
        timer.record();

        result?;
        Ok(())
    }

    async fn take(&self, id: Uuid) -> RepoResult<Option<CaptchaChallenge>> {
        let timer = QueryTimer::new("take_captcha");
        let result = sqlx::query_as::<_, CaptchaEntity>(
            "DELETE FROM captcha_challenges WHERE id = $1 RETURNING id, code, expires_at",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(result?.map(CaptchaChallenge::from))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let timer = QueryTimer::new("purge_expired_captchas");
        let result = sqlx::query("DELETE FROM captcha_challenges WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await;
        timer.record();

        Ok(result?.rows_affected())
    }
}

/// Readiness check that round-trips a trivial query.
#[derive(Clone)]
pub struct PgHealthProbe {
    pool: PgPool,
}

impl PgHealthProbe {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthProbe for PgHealthProbe {
    async fn ping(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
