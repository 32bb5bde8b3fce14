use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::CaptchaService;
use persistence::Repositories;
use shared::jwt::{JwtConfig, JwtError};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, security_headers, trace_id,
    RateLimiterState,
};
use crate::routes::{
    auth, captcha, carousel, contacts, documents, health, projects, send_email, settings, upload,
    users,
};
use crate::services::{AuthService, BlobStore, Mailer};

/// Multipart framing allowance on top of `storage.max_upload_bytes`.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub repos: Repositories,
    pub captcha: CaptchaService,
    pub auth: AuthService,
    pub mailer: Arc<dyn Mailer>,
    pub blob_store: Arc<dyn BlobStore>,
    pub jwt: Arc<JwtConfig>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

impl AppState {
    pub fn new(
        config: Config,
        repos: Repositories,
        mailer: Arc<dyn Mailer>,
        blob_store: Arc<dyn BlobStore>,
    ) -> Result<Self, JwtError> {
        let jwt = Arc::new(JwtConfig::new(
            &config.jwt.secret,
            config.jwt.session_expiry_secs,
            config.jwt.leeway_secs,
        )?);
        let captcha = CaptchaService::new(repos.captchas.clone(), config.captcha.ttl_secs);
        let auth = AuthService::new(repos.users.clone(), jwt.clone(), &config.email.site_base_url);
        let rate_limiter = RateLimiterState::new(config.security.rate_limit_per_minute).map(Arc::new);

        Ok(Self {
            config: Arc::new(config),
            repos,
            captcha,
            auth,
            mailer,
            blob_store,
            jwt,
            rate_limiter,
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Anonymous form endpoints, rate limited per client
    let public_forms = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/captcha", get(captcha::issue))
        .route("/api/contacts", post(contacts::submit))
        .route("/api/send-email", post(send_email::send))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let auth_routes = Router::new()
        .route("/api/auth/session", get(auth::session))
        .route("/api/auth/reset-password", post(auth::reset_password));

    let project_routes = Router::new()
        .route("/api/projects", get(projects::list_public))
        .route(
            "/api/projects/admin",
            get(projects::list_admin).post(projects::create),
        )
        .route("/api/projects/reorder", post(projects::reorder))
        .route(
            "/api/projects/:id",
            get(projects::get)
                .put(projects::update)
                .delete(projects::delete),
        )
        .route("/api/projects/:id/move", post(projects::move_project));

    let document_routes = Router::new()
        .route("/api/documents", get(documents::list_public))
        .route(
            "/api/documents/admin",
            get(documents::list_admin)
                .post(documents::create)
                .patch(documents::update)
                .delete(documents::delete),
        )
        .route("/api/documents/:id", get(documents::get))
        .route("/api/documents/:id/download", post(documents::download));

    let carousel_routes = Router::new()
        .route(
            "/api/carousel",
            get(carousel::list_public).post(carousel::create),
        )
        .route("/api/carousel/admin", get(carousel::list_admin))
        .route(
            "/api/carousel/reorder",
            post(carousel::swap).put(carousel::reindex),
        )
        .route(
            "/api/carousel/:id",
            get(carousel::get)
                .patch(carousel::update)
                .delete(carousel::delete),
        );

    let contact_routes = Router::new().route(
        "/api/contacts/admin",
        get(contacts::list)
            .patch(contacts::update)
            .delete(contacts::delete),
    );

    let user_routes = Router::new()
        .route(
            "/api/users",
            get(users::list)
                .post(users::create)
                .put(users::update)
                .delete(users::delete),
        )
        .route("/api/users/change-password", post(users::change_password));

    let settings_routes = Router::new().route(
        "/api/settings",
        get(settings::list)
            .post(settings::upsert)
            .put(settings::upsert_batch)
            .delete(settings::delete),
    );

    let upload_routes = Router::new().route(
        "/api/upload",
        post(upload::upload).layer(DefaultBodyLimit::max(
            config.storage.max_upload_bytes + MULTIPART_OVERHEAD_BYTES,
        )),
    );

    let health_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/api/health/ready", get(health::ready))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_forms)
        .merge(auth_routes)
        .merge(project_routes)
        .merge(document_routes)
        .merge(carousel_routes)
        .merge(contact_routes)
        .merge(user_routes)
        .merge(settings_routes)
        .merge(upload_routes)
        .merge(health_routes)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            config.security.hsts_enabled,
            security_headers,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
