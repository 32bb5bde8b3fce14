//! Persistence layer for the Banglong site backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - PostgreSQL repository implementations
//! - In-memory repository implementations

pub mod db;
pub mod entities;
pub mod memory;
pub mod metrics;
pub mod repositories;

use std::sync::Arc;

use domain::repositories::{
    CaptchaStore, CarouselRepository, ContactRepository, DocumentRepository, HealthProbe,
    ProjectRepository, SiteSettingsRepository, UserRepository,
};
use sqlx::PgPool;

use crate::memory::MemoryStore;
use crate::repositories::{
    PgCaptchaStore, PgCarouselRepository, PgContactRepository, PgDocumentRepository,
    PgHealthProbe, PgProjectRepository, PgSiteSettingsRepository, PgUserRepository,
};

/// One handle per repository trait, shared by every request handler.
#[derive(Clone)]
pub struct Repositories {
    pub projects: Arc<dyn ProjectRepository>,
    pub documents: Arc<dyn DocumentRepository>,
    pub carousel: Arc<dyn CarouselRepository>,
    pub contacts: Arc<dyn ContactRepository>,
    pub users: Arc<dyn UserRepository>,
    pub settings: Arc<dyn SiteSettingsRepository>,
    pub captchas: Arc<dyn CaptchaStore>,
    pub health: Arc<dyn HealthProbe>,
}

impl Repositories {
    /// PostgreSQL repositories over one pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            projects: Arc::new(PgProjectRepository::new(pool.clone())),
            documents: Arc::new(PgDocumentRepository::new(pool.clone())),
            carousel: Arc::new(PgCarouselRepository::new(pool.clone())),
            contacts: Arc::new(PgContactRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            settings: Arc::new(PgSiteSettingsRepository::new(pool.clone())),
            captchas: Arc::new(PgCaptchaStore::new(pool.clone())),
            health: Arc::new(PgHealthProbe::new(pool)),
        }
    }

    /// Fresh, empty in-memory repositories.
    pub fn in_memory() -> Self {
        Self::from_memory(&MemoryStore::new())
    }

    /// In-memory repositories over an existing store.
    pub fn from_memory(store: &MemoryStore) -> Self {
        Self {
            projects: Arc::new(store.projects()),
            documents: Arc::new(store.documents()),
            carousel: Arc::new(store.carousel()),
            contacts: Arc::new(store.contacts()),
            users: Arc::new(store.users()),
            settings: Arc::new(store.settings()),
            captchas: Arc::new(store.captchas()),
            health: Arc::new(store.clone()),
        }
    }

    /// Replaces the captcha store, e.g. process memory in front of PostgreSQL.
    pub fn with_captcha_store(mut self, store: Arc<dyn CaptchaStore>) -> Self {
        self.captchas = store;
        self
    }
}
