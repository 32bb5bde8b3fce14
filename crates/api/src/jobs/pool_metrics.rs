//! Periodic PostgreSQL pool gauges.

use sqlx::PgPool;
use tracing::warn;

use super::scheduler::{Job, JobError, JobFrequency};

/// Only registered when repositories run on PostgreSQL.
pub struct PoolMetricsJob {
    pool: PgPool,
}

impl PoolMetricsJob {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// True when every allowed connection is checked out.
fn is_saturated(size: u32, idle: usize, max: u32) -> bool {
    max > 0 && size >= max && idle == 0
}

#[async_trait::async_trait]
impl Job for PoolMetricsJob {
    fn name(&self) -> &'static str {
        "pool_metrics"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(10)
    }

    async fn execute(&self) -> Result<(), JobError> {
        persistence::metrics::record_pool_metrics(&self.pool);

        let max = self.pool.options().get_max_connections();
        if is_saturated(self.pool.size(), self.pool.num_idle(), max) {
            warn!(max_connections = max, "Database pool saturated");
        }
        Ok(())
    }
}
