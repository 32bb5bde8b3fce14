//! Interval scheduler for housekeeping jobs.
//!
//! Each registered job gets its own task that ticks on the job's period until
//! the scheduler is shut down. A failing run is logged and counted; the job
//! keeps its schedule.

use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::middleware::metrics::record_job_run;

/// Period between two runs of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFrequency {
    Seconds(u64),
    Minutes(u64),
}

impl JobFrequency {
    /// The period, never shorter than one second.
    pub fn duration(&self) -> Duration {
        match *self {
            JobFrequency::Seconds(secs) => Duration::from_secs(secs.max(1)),
            JobFrequency::Minutes(mins) => Duration::from_secs(mins.max(1) * 60),
        }
    }
}

/// A failed job run.
#[derive(Debug, Error)]
#[error("{context}: {source}")]
pub struct JobError {
    context: &'static str,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl JobError {
    pub fn new<E>(context: &'static str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            context,
            source: Box::new(source),
        }
    }
}

#[async_trait::async_trait]
pub trait Job: Send + Sync {
    /// Stable name used in logs and the `job` metric label.
    fn name(&self) -> &'static str;

    fn frequency(&self) -> JobFrequency;

    /// Whether the first run happens right at start instead of one period later.
    fn run_on_start(&self) -> bool {
        false
    }

    async fn execute(&self) -> Result<(), JobError>;
}

pub struct JobScheduler {
    jobs: Vec<Arc<dyn Job>>,
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl JobScheduler {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            jobs: Vec::new(),
            shutdown_tx,
            handles: Vec::new(),
        }
    }

    pub fn register<J: Job + 'static>(&mut self, job: J) {
        self.jobs.push(Arc::new(job));
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Spawns one task per registered job.
    pub fn start(&mut self) {
        info!(jobs = self.jobs.len(), "Starting job scheduler");

        for job in &self.jobs {
            let handle = tokio::spawn(run_job(Arc::clone(job), self.shutdown_tx.subscribe()));
            self.handles.push(handle);
        }
    }

    /// Signals every job to stop. Returns immediately.
    pub fn shutdown(&self) {
        info!("Stopping job scheduler");
        let _ = self.shutdown_tx.send(true);
    }

    /// Waits for the job tasks to finish, at most `timeout`.
    pub async fn wait_for_shutdown(self, timeout: Duration) {
        let all_done = async {
            for handle in self.handles {
                if let Err(e) = handle.await {
                    warn!(error = %e, "Job task panicked");
                }
            }
        };

        match tokio::time::timeout(timeout, all_done).await {
            Ok(()) => info!("Job scheduler stopped"),
            Err(_) => warn!(timeout_secs = timeout.as_secs(), "Job scheduler stop timed out"),
        }
    }
}

impl Default for JobScheduler {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_job(job: Arc<dyn Job>, mut shutdown_rx: watch::Receiver<bool>) {
    let name = job.name();
    let frequency = job.frequency();
    let mut interval = tokio::time::interval(frequency.duration());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // tokio's first tick completes immediately
    if !job.run_on_start() {
        interval.tick().await;
    }

    debug!(job = name, frequency = ?frequency, "Job scheduled");

    loop {
        tokio::select! {
            _ = interval.tick() => run_once(job.as_ref()).await,
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    debug!(job = name, "Job stopped");
                    break;
                }
            }
        }
    }
}

async fn run_once(job: &dyn Job) {
    let start = Instant::now();
    let result = job.execute().await;
    let elapsed = start.elapsed();
    record_job_run(job.name(), result.is_ok(), elapsed);

    match result {
        Ok(()) => debug!(job = job.name(), elapsed_ms = elapsed.as_millis(), "Job run finished"),
        Err(e) => error!(
            job = job.name(),
            elapsed_ms = elapsed.as_millis(),
            error = %e,
            "Job run failed"
        ),
    }
}
