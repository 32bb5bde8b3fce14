//! Site setting and captcha challenge entities.

use chrono::{DateTime, Utc};
use domain::models::captcha::CaptchaChallenge;
use domain::models::site_setting::SiteSetting;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the site_settings table.
#[derive(Debug, Clone, FromRow)]
pub struct SiteSettingEntity {
    pub setting_type: String,
    pub setting_key: String,
    pub value: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SiteSettingEntity> for SiteSetting {
    fn from(entity: SiteSettingEntity) -> Self {
        Self {
            setting_type: entity.setting_type,
            key: entity.setting_key,
            value: entity.value,
            description: entity.description,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the captcha_challenges table.
#[derive(Debug, Clone, FromRow)]
pub struct CaptchaEntity {
    pub id: Uuid,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl From<CaptchaEntity> for CaptchaChallenge {
    fn from(entity: CaptchaEntity) -> Self {
        Self {
            id: entity.id,
            code: entity.code,
            expires_at: entity.expires_at,
        }
    }
}
