//! Evicts expired CAPTCHA challenges.

use domain::services::CaptchaService;
use tracing::info;

use super::scheduler::{Job, JobError, JobFrequency};

pub struct CaptchaSweepJob {
    captcha: CaptchaService,
    interval_secs: u64,
}

impl CaptchaSweepJob {
    pub fn new(captcha: CaptchaService, interval_secs: u64) -> Self {
        Self {
            captcha,
            interval_secs,
        }
    }
}

#[async_trait::async_trait]
impl Job for CaptchaSweepJob {
    fn name(&self) -> &'static str {
        "captcha_sweep"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(self.interval_secs)
    }

    /// Clears challenges left over from before a restart.
    fn run_on_start(&self) -> bool {
        true
    }

    async fn execute(&self) -> Result<(), JobError> {
        let purged = self
            .captcha
            .purge_expired()
            .await
            .map_err(|e| JobError::new("Failed to purge expired captchas", e))?;

        if purged > 0 {
            info!(purged = purged, "Purged expired captchas");
        }
        Ok(())
    }
}
