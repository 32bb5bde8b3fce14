//! Site settings repository for database operations.

use async_trait::async_trait;
use domain::models::site_setting::{SettingUpsert, SiteSetting};
use domain::repositories::{RepoResult, SiteSettingsRepository};
use sqlx::PgPool;

use crate::entities::SiteSettingEntity;
use crate::metrics::QueryTimer;

const UPSERT_SQL: &str = r#"
    INSERT INTO site_settings (setting_type, setting_key, value, description)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (setting_type, setting_key) DO UPDATE SET
        value = EXCLUDED.value,
        description = COALESCE(EXCLUDED.description, site_settings.description),
        updated_at = NOW()
    RETURNING setting_type, setting_key, value, description, created_at, updated_at
"#;

/// PostgreSQL-backed [`SiteSettingsRepository`].
#[derive(Clone)]
pub struct PgSiteSettingsRepository {
    pool: PgPool,
}

impl PgSiteSettingsRepository {
    /// Creates a new PgSiteSettingsRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SiteSettingsRepository for PgSiteSettingsRepository {
    async fn list(&self, setting_type: Option<&str>) -> RepoResult<Vec<SiteSetting>> {
        let timer = QueryTimer::new("list_site_settings");
        let result = sqlx::query_as::<_, SiteSettingEntity>(
            r#"
            SELECT setting_type, setting_key, value, description, created_at, updated_at
            FROM site_settings
            WHERE ($1::text IS NULL OR setting_type = $1)
            ORDER BY setting_type, setting_key
            "#,
        )
        .bind(setting_type)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        Ok(result?.into_iter().map(SiteSetting::from).collect())
    }

    async fn get(&self, setting_type: &str, key: &str) -> RepoResult<Option<SiteSetting>> {
        let timer = QueryTimer::new("get_site_setting");
        let result = sqlx::query_as::<_, SiteSettingEntity>(
            r#"
            SELECT setting_type, setting_key, value, description, created_at, updated_at
            FROM site_settings
            WHERE setting_type = $1 AND setting_key = $2
            "#,
        )
        .bind(setting_type)
        .bind(key)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(result?.map(SiteSetting::from))
    }

    async fn upsert(&self, setting: SettingUpsert) -> RepoResult<SiteSetting> {
        let timer = QueryTimer::new("upsert_site_setting");
        let result = sqlx::query_as::<_, SiteSettingEntity>(UPSERT_SQL)
            .bind(&setting.setting_type)
            .bind(&setting.key)
            .bind(&setting.value)
            .bind(&setting.description)
            .fetch_one(&self.pool)
            .await;
        timer.record();

        Ok(result?.into())
    }

    async fn upsert_many(&self, settings: Vec<SettingUpsert>) -> RepoResult<Vec<SiteSetting>> {
        let timer = QueryTimer::new("upsert_site_settings_batch");
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(settings.len());

        for setting in settings {
            let row = sqlx::query_as::<_, SiteSettingEntity>(UPSERT_SQL)
                .bind(&setting.setting_type)
                .bind(&setting.key)
                .bind(&setting.value)
                .bind(&setting.description)
                .fetch_one(&mut *tx)
                .await?;
            saved.push(SiteSetting::from(row));
        }

        tx.commit().await?;
        timer.record();

        Ok(saved)
    }

    async fn delete(&self, setting_type: &str, key: &str) -> RepoResult<bool> {
        let timer = QueryTimer::new("delete_site_setting");
        let result =
            sqlx::query("DELETE FROM site_settings WHERE setting_type = $1 AND setting_key = $2")
                .bind(setting_type)
                .bind(key)
                .execute(&self.pool)
                .await;
        timer.record();

        Ok(result?.rows_affected() > 0)
    }
}
