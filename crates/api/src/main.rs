use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use banglong_api::app::{create_app, AppState};
use banglong_api::config::{Config, StoreBackend};
use banglong_api::jobs::{CaptchaSweepJob, JobScheduler, PoolMetricsJob, RateLimitPruneJob};
use banglong_api::middleware::{init_metrics, logging::init_logging};
use banglong_api::services::admin_bootstrap::{bootstrap_admin, BootstrapOutcome};
use banglong_api::services::{blob_storage, EmailService};
use persistence::memory::MemoryStore;
use persistence::Repositories;

const JOB_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    init_logging(&config.logging)?;
    init_metrics()?;

    info!("Starting Banglong site API v{}", env!("CARGO_PKG_VERSION"));

    let (repos, pool) = match config.database.store {
        StoreBackend::Postgres => {
            let pool = persistence::db::create_pool(&(&config.database).into()).await?;

            info!("Running database migrations...");
            persistence::db::run_migrations(&pool).await?;
            info!("Migrations completed");

            let mut repos = Repositories::postgres(pool.clone());
            if config.captcha.store == StoreBackend::Memory {
                info!("Keeping captcha challenges in process memory");
                repos = repos.with_captcha_store(Arc::new(MemoryStore::new().captchas()));
            }
            (repos, Some(pool))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data is lost on restart");
            (Repositories::in_memory(), None)
        }
    };

    match bootstrap_admin(repos.users.as_ref(), &config.admin).await? {
        BootstrapOutcome::Created => info!("Bootstrap admin account created"),
        BootstrapOutcome::AlreadyExists | BootstrapOutcome::NotConfigured => {}
    }

    let mailer = Arc::new(EmailService::new(config.email.clone())?);
    let blob_store = blob_storage::from_config(&config.storage)?;

    if config.captcha.expose_code {
        warn!("captcha.expose_code is enabled: CAPTCHA answers are returned to clients");
    }

    let addr: SocketAddr = config.socket_addr()?;
    let state = AppState::new(config, repos, mailer, blob_store)?;

    let mut scheduler = JobScheduler::new();
    scheduler.register(CaptchaSweepJob::new(
        state.captcha.clone(),
        state.config.captcha.sweep_interval_secs,
    ));
    if let Some(pool) = pool {
        scheduler.register(PoolMetricsJob::new(pool));
    }
    if let Some(limiter) = state.rate_limiter.clone() {
        scheduler.register(RateLimitPruneJob::new(limiter));
    }
    scheduler.start();

    let app = create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(JOB_SHUTDOWN_TIMEOUT).await;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT (Ctrl-C), starting graceful shutdown"),
        () = terminate => info!("Received SIGTERM, starting graceful shutdown"),
    }
}
