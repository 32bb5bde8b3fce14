//! CAPTCHA challenge model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A pending challenge. Consumed by the first verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptchaChallenge {
    pub id: Uuid,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl CaptchaChallenge {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Response body of `GET /api/captcha`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptchaResponse {
    pub success: bool,
    pub captcha_id: Uuid,
    /// `data:image/png;base64,...`
    pub captcha_image: String,
    /// Plaintext answer; only present when explicitly enabled for testing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}
