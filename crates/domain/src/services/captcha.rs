//! CAPTCHA issuance and single-use verification.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

use crate::models::captcha::CaptchaChallenge;
use crate::repositories::{CaptchaStore, RepositoryError};

/// Challenges expire ten minutes after issue.
pub const DEFAULT_TTL_SECS: i64 = 600;

/// Number of digits in a challenge code.
pub const CODE_LENGTH: usize = 4;

#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("Captcha store unavailable: {0}")]
    Store(#[from] RepositoryError),
}

/// A freshly issued challenge. The code is for rendering, not for clients.
#[derive(Debug, Clone)]
pub struct IssuedCaptcha {
    pub id: Uuid,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Uniform four-digit code in `1000..=9999`.
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(1000..=9999).to_string()
}

/// Issues and verifies challenges against a [`CaptchaStore`].
#[derive(Clone)]
pub struct CaptchaService {
    store: Arc<dyn CaptchaStore>,
    ttl: Duration,
}

impl CaptchaService {
    pub fn new(store: Arc<dyn CaptchaStore>, ttl_secs: i64) -> Self {
        Self {
            store,
            ttl: Duration::seconds(ttl_secs),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn issue(&self) -> Result<IssuedCaptcha, CaptchaError> {
        self.issue_at(Utc::now()).await
    }

    pub async fn issue_at(&self, now: DateTime<Utc>) -> Result<IssuedCaptcha, CaptchaError> {
        let challenge = CaptchaChallenge {
            id: Uuid::new_v4(),
            code: generate_code(),
            expires_at: now + self.ttl,
        };
        self.store.save(&challenge).await?;

        Ok(IssuedCaptcha {
            id: challenge.id,
            code: challenge.code,
            expires_at: challenge.expires_at,
        })
    }

    /// Checks an answer. The challenge is consumed whatever the outcome.
    pub async fn verify(&self, id: Uuid, answer: &str) -> Result<bool, CaptchaError> {
        self.verify_at(id, answer, Utc::now()).await
    }

    pub async fn verify_at(
        &self,
        id: Uuid,
        answer: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, CaptchaError> {
        let Some(challenge) = self.store.take(id).await? else {
            tracing::debug!(captcha_id = %id, "Captcha not found or already used");
            return Ok(false);
        };

        if challenge.is_expired(now) {
            tracing::debug!(captcha_id = %id, "Captcha expired");
            return Ok(false);
        }

        Ok(shared::crypto::constant_time_eq(&challenge.code, answer.trim()))
    }

    /// Like [`verify`](Self::verify) for an id received as text.
    /// Malformed ids never match.
    pub async fn verify_str(&self, id: &str, answer: &str) -> Result<bool, CaptchaError> {
        match Uuid::parse_str(id.trim()) {
            Ok(id) => self.verify(id, answer).await,
            Err(_) => Ok(false),
        }
    }

    /// Removes expired challenges; returns how many were dropped.
    pub async fn purge_expired(&self) -> Result<u64, CaptchaError> {
        Ok(self.store.purge_expired(Utc::now()).await?)
    }
}
