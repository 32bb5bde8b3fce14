//! Drops idle clients from the rate limiter.

use std::sync::Arc;

use super::scheduler::{Job, JobError, JobFrequency};
use crate::middleware::RateLimiterState;

pub struct RateLimitPruneJob {
    limiter: Arc<RateLimiterState>,
}

impl RateLimitPruneJob {
    pub fn new(limiter: Arc<RateLimiterState>) -> Self {
        Self { limiter }
    }
}

#[async_trait::async_trait]
impl Job for RateLimitPruneJob {
    fn name(&self) -> &'static str {
        "rate_limit_prune"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(5)
    }

    async fn execute(&self) -> Result<(), JobError> {
        let tracked = self.limiter.prune();
        tracing::debug!(tracked_clients = tracked, "Pruned rate limiter state");
        Ok(())
    }
}
