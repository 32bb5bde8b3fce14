//! Repository interfaces, one per entity.
//!
//! Handlers depend only on these traits. `persistence` provides PostgreSQL
//! implementations and in-memory ones used by tests and local development.

pub mod error;
pub mod filters;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::captcha::CaptchaChallenge;
use crate::models::carousel::{CarouselChanges, CarouselItem, NewCarouselItem};
use crate::models::contact::{ContactChanges, ContactSubmission, NewContactSubmission};
use crate::models::document::{Document, DocumentChanges, NewDocument};
use crate::models::ordering::{MoveDirection, SwapOutcome};
use crate::models::project::{NewProject, Project, ProjectChanges, ProjectSummary};
use crate::models::site_setting::{SettingUpsert, SiteSetting};
use crate::models::user::{NewUser, User, UserChanges};

pub use error::RepositoryError;
pub use filters::{ContactFilter, DocumentFilter, ProjectFilter};

pub type RepoResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Ordered by category, then `order`.
    async fn list(&self, filter: &ProjectFilter) -> RepoResult<Vec<Project>>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Project>>;

    /// Title and cover image for each existing id; unknown ids are skipped.
    async fn summaries(&self, ids: &[Uuid]) -> RepoResult<Vec<ProjectSummary>>;

    /// Inserts with `order` = highest order in the category + 1.
    async fn create(&self, project: NewProject) -> RepoResult<Project>;

    async fn update(&self, id: Uuid, changes: ProjectChanges) -> RepoResult<Option<Project>>;

    /// Detaches linked documents and deletes, atomically. `false` if absent.
    async fn delete(&self, id: Uuid) -> RepoResult<bool>;

    /// Sets `order = position + 1` for each id, all or nothing.
    /// Fails with `NotFound` if any id is unknown.
    async fn reindex(&self, ids: &[Uuid]) -> RepoResult<()>;

    /// Swaps order with the nearest project of the same category.
    async fn swap_adjacent(&self, id: Uuid, direction: MoveDirection) -> RepoResult<SwapOutcome>;
}

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Ordered by category, then `order`.
    async fn list(&self, filter: &DocumentFilter) -> RepoResult<Vec<Document>>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Document>>;

    /// Inserts with `order` = highest order in the category + 1.
    async fn create(&self, document: NewDocument) -> RepoResult<Document>;

    async fn update(&self, id: Uuid, changes: DocumentChanges) -> RepoResult<Option<Document>>;

    async fn delete(&self, id: Uuid) -> RepoResult<bool>;

    /// Increments the download counter; returns the new count.
    async fn record_download(&self, id: Uuid) -> RepoResult<Option<i64>>;
}

#[async_trait]
pub trait CarouselRepository: Send + Sync {
    /// Ordered by `order`.
    async fn list(&self, active_only: bool) -> RepoResult<Vec<CarouselItem>>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<CarouselItem>>;

    /// Inserts with `order` = highest order + 1.
    async fn create(&self, item: NewCarouselItem) -> RepoResult<CarouselItem>;

    async fn update(&self, id: Uuid, changes: CarouselChanges) -> RepoResult<Option<CarouselItem>>;

    async fn delete(&self, id: Uuid) -> RepoResult<bool>;

    async fn reindex(&self, ids: &[Uuid]) -> RepoResult<()>;

    async fn swap_adjacent(&self, id: Uuid, direction: MoveDirection) -> RepoResult<SwapOutcome>;
}

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, submission: NewContactSubmission) -> RepoResult<ContactSubmission>;

    /// Newest first, windowed; also returns the total number of matches.
    async fn list(&self, filter: &ContactFilter) -> RepoResult<(Vec<ContactSubmission>, i64)>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<ContactSubmission>>;

    async fn update(&self, id: Uuid, changes: ContactChanges) -> RepoResult<Option<ContactSubmission>>;

    async fn delete(&self, id: Uuid) -> RepoResult<bool>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Newest first.
    async fn list(&self) -> RepoResult<Vec<User>>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>>;

    /// `email` must already be lowercase.
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Fails with `Conflict` when the email is taken.
    async fn create(&self, user: NewUser) -> RepoResult<User>;

    async fn update(&self, id: Uuid, changes: UserChanges) -> RepoResult<Option<User>>;

    async fn delete(&self, id: Uuid) -> RepoResult<bool>;

    /// Replaces the password, clears any reset token and records whether
    /// the user chose it themselves.
    async fn set_password(&self, id: Uuid, password_hash: &str, user_chosen: bool) -> RepoResult<bool>;

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<bool>;
}

#[async_trait]
pub trait SiteSettingsRepository: Send + Sync {
    /// Ordered by type, then key.
    async fn list(&self, setting_type: Option<&str>) -> RepoResult<Vec<SiteSetting>>;

    async fn get(&self, setting_type: &str, key: &str) -> RepoResult<Option<SiteSetting>>;

    async fn upsert(&self, setting: SettingUpsert) -> RepoResult<SiteSetting>;

    /// Upserts every entry in one transaction.
    async fn upsert_many(&self, settings: Vec<SettingUpsert>) -> RepoResult<Vec<SiteSetting>>;

    async fn delete(&self, setting_type: &str, key: &str) -> RepoResult<bool>;
}

/// Keyed challenge store with expiry, shared by every server instance.
#[async_trait]
pub trait CaptchaStore: Send + Sync {
    async fn save(&self, challenge: &CaptchaChallenge) -> RepoResult<()>;

    /// Removes and returns the challenge in one step.
    async fn take(&self, id: Uuid) -> RepoResult<Option<CaptchaChallenge>>;

    /// Deletes challenges expired at `now`; returns how many.
    async fn purge_expired(&self, now: DateTime<Utc>) -> RepoResult<u64>;
}

/// Liveness check of the backing store.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn ping(&self) -> RepoResult<()>;
}
