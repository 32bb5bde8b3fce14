//! In-memory repository implementations.
//!
//! Every repository shares one set of tables behind a single lock, so
//! multi-row operations (reindex, swap, project delete) are atomic the same
//! way their PostgreSQL counterparts are. Used by the test suites and by
//! `database.store = "memory"` for local development.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::captcha::CaptchaChallenge;
use domain::models::carousel::{CarouselChanges, CarouselItem, NewCarouselItem};
use domain::models::contact::{ContactChanges, ContactStatus, ContactSubmission, NewContactSubmission};
use domain::models::document::{Document, DocumentChanges, NewDocument};
use domain::models::ordering::{MoveDirection, SwapOutcome};
use domain::models::project::{NewProject, Project, ProjectChanges, ProjectSummary};
use domain::models::site_setting::{SettingUpsert, SiteSetting};
use domain::models::user::{NewUser, User, UserChanges};
use domain::repositories::{
    CaptchaStore, CarouselRepository, ContactFilter, ContactRepository, DocumentFilter,
    DocumentRepository, HealthProbe, ProjectFilter, ProjectRepository, RepoResult,
    RepositoryError, SiteSettingsRepository, UserRepository,
};
use domain::services::ordering::{find_adjacent, next_order, reindex_positions};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    projects: Vec<Project>,
    documents: Vec<Document>,
    carousel: Vec<CarouselItem>,
    contacts: Vec<ContactSubmission>,
    users: Vec<User>,
    settings: BTreeMap<(String, String), SiteSetting>,
    captchas: HashMap<Uuid, CaptchaChallenge>,
}

impl Tables {
    fn project_exists(&self, id: Uuid) -> bool {
        self.projects.iter().any(|p| p.id == id)
    }

    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .iter()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

/// Shared handle to the in-memory tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projects(&self) -> MemoryProjectRepository {
        MemoryProjectRepository(self.clone())
    }

    pub fn documents(&self) -> MemoryDocumentRepository {
        MemoryDocumentRepository(self.clone())
    }

    pub fn carousel(&self) -> MemoryCarouselRepository {
        MemoryCarouselRepository(self.clone())
    }

    pub fn contacts(&self) -> MemoryContactRepository {
        MemoryContactRepository(self.clone())
    }

    pub fn users(&self) -> MemoryUserRepository {
        MemoryUserRepository(self.clone())
    }

    pub fn settings(&self) -> MemorySiteSettingsRepository {
        MemorySiteSettingsRepository(self.clone())
    }

    pub fn captchas(&self) -> MemoryCaptchaStore {
        MemoryCaptchaStore(self.clone())
    }
}

#[async_trait]
impl HealthProbe for MemoryStore {
    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }
}

/// Swaps `order` between item `id` and its nearest peer in `direction`.
fn swap_in<T, F, S>(
    items: &mut [T],
    id: Uuid,
    direction: MoveDirection,
    id_of: F,
    is_peer: impl Fn(&T, &T) -> bool,
    order_of: S,
    set_order: impl Fn(&mut T, i32),
) -> SwapOutcome
where
    F: Fn(&T) -> Uuid,
    S: Fn(&T) -> i32,
{
    let Some(current_idx) = items.iter().position(|i| id_of(i) == id) else {
        return SwapOutcome::NotFound;
    };
    let current_order = order_of(&items[current_idx]);

    let peers: Vec<(Uuid, i32)> = items
        .iter()
        .filter(|i| is_peer(i, &items[current_idx]))
        .map(|i| (id_of(i), order_of(i)))
        .collect();

    let Some(&(neighbour_id, neighbour_order)) =
        find_adjacent(&peers, |p| p.1, current_order, direction)
    else {
        return SwapOutcome::Boundary;
    };

    for item in items.iter_mut() {
        let item_id = id_of(item);
        if item_id == id {
            set_order(item, neighbour_order);
        } else if item_id == neighbour_id {
            set_order(item, current_order);
        }
    }

    SwapOutcome::Swapped { with: neighbour_id }
}

/// Applies `reindex_positions`, failing without changes on an unknown id.
fn reindex_in<T>(
    items: &mut [T],
    ids: &[Uuid],
    id_of: impl Fn(&T) -> Uuid,
    set_order: impl Fn(&mut T, i32),
) -> RepoResult<()> {
    if ids.iter().any(|id| !items.iter().any(|i| id_of(i) == *id)) {
        return Err(RepositoryError::NotFound);
    }
    for (id, order) in reindex_positions(ids) {
        if let Some(item) = items.iter_mut().find(|i| id_of(i) == id) {
            set_order(item, order);
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct MemoryProjectRepository(MemoryStore);

#[async_trait]
impl ProjectRepository for MemoryProjectRepository {
    async fn list(&self, filter: &ProjectFilter) -> RepoResult<Vec<Project>> {
        let tables = self.0.tables.read().await;
        let mut projects: Vec<Project> = tables
            .projects
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        projects.sort_by_key(|p| (p.category, p.order, p.created_at));
        Ok(projects)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Project>> {
        let tables = self.0.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn summaries(&self, ids: &[Uuid]) -> RepoResult<Vec<ProjectSummary>> {
        let tables = self.0.tables.read().await;
        Ok(tables
            .projects
            .iter()
            .filter(|p| ids.contains(&p.id))
            .map(ProjectSummary::from)
            .collect())
    }

    async fn create(&self, project: NewProject) -> RepoResult<Project> {
        let mut tables = self.0.tables.write().await;
        let order = next_order(
            tables
                .projects
                .iter()
                .filter(|p| p.category == project.category)
                .map(|p| p.order),
        );
        let now = Utc::now();
        let created = Project {
            id: Uuid::new_v4(),
            title: project.title,
            description: project.description,
            category: project.category,
            image_url: project.image_url,
            details: project.details,
            order,
            is_active: project.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.projects.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, changes: ProjectChanges) -> RepoResult<Option<Project>> {
        let mut tables = self.0.tables.write().await;
        let Some(project) = tables.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        changes.apply(project);
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let mut tables = self.0.tables.write().await;
        let before = tables.projects.len();
        tables.projects.retain(|p| p.id != id);
        if tables.projects.len() == before {
            return Ok(false);
        }

        let now = Utc::now();
        for doc in tables.documents.iter_mut().filter(|d| d.project_id == Some(id)) {
            doc.project_id = None;
            doc.updated_at = now;
        }
        Ok(true)
    }

    async fn reindex(&self, ids: &[Uuid]) -> RepoResult<()> {
        let mut tables = self.0.tables.write().await;
        let now = Utc::now();
        reindex_in(&mut tables.projects, ids, |p| p.id, |p, order| {
            p.order = order;
            p.updated_at = now;
        })
    }

    async fn swap_adjacent(&self, id: Uuid, direction: MoveDirection) -> RepoResult<SwapOutcome> {
        let mut tables = self.0.tables.write().await;
        let now = Utc::now();
        Ok(swap_in(
            &mut tables.projects,
            id,
            direction,
            |p| p.id,
            |p, current| p.category == current.category,
            |p| p.order,
            |p, order| {
                p.order = order;
                p.updated_at = now;
            },
        ))
    }
}

#[derive(Debug, Clone)]
pub struct MemoryDocumentRepository(MemoryStore);

#[async_trait]
impl DocumentRepository for MemoryDocumentRepository {
    async fn list(&self, filter: &DocumentFilter) -> RepoResult<Vec<Document>> {
        let tables = self.0.tables.read().await;
        let mut documents: Vec<Document> = tables
            .documents
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        documents.sort_by(|a, b| {
            (&a.category, a.order, a.created_at).cmp(&(&b.category, b.order, b.created_at))
        });
        Ok(documents)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Document>> {
        let tables = self.0.tables.read().await;
        Ok(tables.documents.iter().find(|d| d.id == id).cloned())
    }

    async fn create(&self, document: NewDocument) -> RepoResult<Document> {
        let mut tables = self.0.tables.write().await;
        if let Some(project_id) = document.project_id {
            if !tables.project_exists(project_id) {
                return Err(RepositoryError::InvalidReference(format!(
                    "project {} does not exist",
                    project_id
                )));
            }
        }

        let order = next_order(
            tables
                .documents
                .iter()
                .filter(|d| d.category == document.category)
                .map(|d| d.order),
        );
        let now = Utc::now();
        let created = Document {
            id: Uuid::new_v4(),
            title: document.title,
            description: document.description,
            file_url: document.file_url,
            file_type: document.file_type,
            category: document.category,
            order,
            is_active: document.is_active,
            project_id: document.project_id,
            download_count: 0,
            created_at: now,
            updated_at: now,
        };
        tables.documents.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, changes: DocumentChanges) -> RepoResult<Option<Document>> {
        let mut tables = self.0.tables.write().await;
        if let Some(Some(project_id)) = changes.project_id {
            if !tables.project_exists(project_id) {
                return Err(RepositoryError::InvalidReference(format!(
                    "project {} does not exist",
                    project_id
                )));
            }
        }

        let Some(doc) = tables.documents.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        changes.apply(doc);
        doc.updated_at = Utc::now();
        Ok(Some(doc.clone()))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let mut tables = self.0.tables.write().await;
        let before = tables.documents.len();
        tables.documents.retain(|d| d.id != id);
        Ok(tables.documents.len() < before)
    }

    async fn record_download(&self, id: Uuid) -> RepoResult<Option<i64>> {
        let mut tables = self.0.tables.write().await;
        Ok(tables.documents.iter_mut().find(|d| d.id == id).map(|d| {
            d.download_count += 1;
            d.download_count
        }))
    }
}

#[derive(Debug, Clone)]
pub struct MemoryCarouselRepository(MemoryStore);

#[async_trait]
impl CarouselRepository for MemoryCarouselRepository {
    async fn list(&self, active_only: bool) -> RepoResult<Vec<CarouselItem>> {
        let tables = self.0.tables.read().await;
        let mut items: Vec<CarouselItem> = tables
            .carousel
            .iter()
            .filter(|i| !active_only || i.is_active)
            .cloned()
            .collect();
        items.sort_by_key(|i| (i.order, i.created_at));
        Ok(items)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<CarouselItem>> {
        let tables = self.0.tables.read().await;
        Ok(tables.carousel.iter().find(|i| i.id == id).cloned())
    }

    async fn create(&self, item: NewCarouselItem) -> RepoResult<CarouselItem> {
        let mut tables = self.0.tables.write().await;
        let order = next_order(tables.carousel.iter().map(|i| i.order));
        let now = Utc::now();
        let created = CarouselItem {
            id: Uuid::new_v4(),
            title: item.title,
            image_url: item.image_url,
            link_url: item.link_url,
            link_text: item.link_text,
            description: item.description,
            order,
            is_active: item.is_active,
            text_position: item.text_position,
            text_direction: item.text_direction,
            created_at: now,
            updated_at: now,
        };
        tables.carousel.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, changes: CarouselChanges) -> RepoResult<Option<CarouselItem>> {
        let mut tables = self.0.tables.write().await;
        let Some(item) = tables.carousel.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        changes.apply(item);
        item.updated_at = Utc::now();
        Ok(Some(item.clone()))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let mut tables = self.0.tables.write().await;
        let before = tables.carousel.len();
        tables.carousel.retain(|i| i.id != id);
        Ok(tables.carousel.len() < before)
    }

    async fn reindex(&self, ids: &[Uuid]) -> RepoResult<()> {
        let mut tables = self.0.tables.write().await;
        let now = Utc::now();
        reindex_in(&mut tables.carousel, ids, |i| i.id, |i, order| {
            i.order = order;
            i.updated_at = now;
        })
    }

    async fn swap_adjacent(&self, id: Uuid, direction: MoveDirection) -> RepoResult<SwapOutcome> {
        let mut tables = self.0.tables.write().await;
        let now = Utc::now();
        Ok(swap_in(
            &mut tables.carousel,
            id,
            direction,
            |i| i.id,
            |_, _| true,
            |i| i.order,
            |i, order| {
                i.order = order;
                i.updated_at = now;
            },
        ))
    }
}

#[derive(Debug, Clone)]
pub struct MemoryContactRepository(MemoryStore);

#[async_trait]
impl ContactRepository for MemoryContactRepository {
    async fn create(&self, submission: NewContactSubmission) -> RepoResult<ContactSubmission> {
        let mut tables = self.0.tables.write().await;
        let now = Utc::now();
        let created = ContactSubmission {
            id: Uuid::new_v4(),
            name: submission.name,
            email: submission.email,
            phone: submission.phone,
            message: submission.message,
            status: ContactStatus::New,
            reply: None,
            privacy_agreed: submission.privacy_agreed,
            created_at: now,
            updated_at: now,
        };
        tables.contacts.push(created.clone());
        Ok(created)
    }

    async fn list(&self, filter: &ContactFilter) -> RepoResult<(Vec<ContactSubmission>, i64)> {
        let tables = self.0.tables.read().await;
        let mut matching: Vec<ContactSubmission> = tables
            .contacts
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        let total = matching.len() as i64;
        Ok((filter.window.slice(&matching).to_vec(), total))
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<ContactSubmission>> {
        let tables = self.0.tables.read().await;
        Ok(tables.contacts.iter().find(|c| c.id == id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: ContactChanges,
    ) -> RepoResult<Option<ContactSubmission>> {
        let mut tables = self.0.tables.write().await;
        let Some(contact) = tables.contacts.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        changes.apply(contact);
        contact.updated_at = Utc::now();
        Ok(Some(contact.clone()))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let mut tables = self.0.tables.write().await;
        let before = tables.contacts.len();
        tables.contacts.retain(|c| c.id != id);
        Ok(tables.contacts.len() < before)
    }
}

#[derive(Debug, Clone)]
pub struct MemoryUserRepository(MemoryStore);

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn list(&self) -> RepoResult<Vec<User>> {
        let tables = self.0.tables.read().await;
        let mut users = tables.users.clone();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        let tables = self.0.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let tables = self.0.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> RepoResult<User> {
        let mut tables = self.0.tables.write().await;
        if tables.email_taken(&user.email, None) {
            return Err(RepositoryError::Conflict(format!(
                "email {} already registered",
                user.email
            )));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            reset_token_hash: user.reset_token_hash,
            reset_token_expires_at: user.reset_token_expires_at,
            has_changed_password: user.has_changed_password,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> RepoResult<Option<User>> {
        let mut tables = self.0.tables.write().await;
        if let Some(email) = &changes.email {
            if tables.email_taken(email, Some(id)) {
                return Err(RepositoryError::Conflict(format!(
                    "email {} already registered",
                    email
                )));
            }
        }

        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        changes.apply(user);
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let mut tables = self.0.tables.write().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        Ok(tables.users.len() < before)
    }

    async fn set_password(&self, id: Uuid, password_hash: &str, user_chosen: bool) -> RepoResult<bool> {
        let mut tables = self.0.tables.write().await;
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(false);
        };
        user.password_hash = password_hash.to_string();
        user.has_changed_password = user_chosen;
        user.reset_token_hash = None;
        user.reset_token_expires_at = None;
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let mut tables = self.0.tables.write().await;
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(false);
        };
        user.reset_token_hash = Some(token_hash.to_string());
        user.reset_token_expires_at = Some(expires_at);
        user.updated_at = Utc::now();
        Ok(true)
    }
}

#[derive(Debug, Clone)]
pub struct MemorySiteSettingsRepository(MemoryStore);

fn upsert_into(
    settings: &mut BTreeMap<(String, String), SiteSetting>,
    setting: SettingUpsert,
    now: DateTime<Utc>,
) -> SiteSetting {
    let key = (setting.setting_type.clone(), setting.key.clone());
    let stored = settings
        .entry(key)
        .and_modify(|existing| {
            existing.value = setting.value.clone();
            if setting.description.is_some() {
                existing.description = setting.description.clone();
            }
            existing.updated_at = now;
        })
        .or_insert_with(|| SiteSetting {
            setting_type: setting.setting_type.clone(),
            key: setting.key.clone(),
            value: setting.value.clone(),
            description: setting.description.clone(),
            created_at: now,
            updated_at: now,
        });
    stored.clone()
}

#[async_trait]
impl SiteSettingsRepository for MemorySiteSettingsRepository {
    async fn list(&self, setting_type: Option<&str>) -> RepoResult<Vec<SiteSetting>> {
        let tables = self.0.tables.read().await;
        Ok(tables
            .settings
            .values()
            .filter(|s| setting_type.map_or(true, |t| s.setting_type == t))
            .cloned()
            .collect())
    }

    async fn get(&self, setting_type: &str, key: &str) -> RepoResult<Option<SiteSetting>> {
        let tables = self.0.tables.read().await;
        Ok(tables
            .settings
            .get(&(setting_type.to_string(), key.to_string()))
            .cloned())
    }

    async fn upsert(&self, setting: SettingUpsert) -> RepoResult<SiteSetting> {
        let mut tables = self.0.tables.write().await;
        Ok(upsert_into(&mut tables.settings, setting, Utc::now()))
    }

    async fn upsert_many(&self, settings: Vec<SettingUpsert>) -> RepoResult<Vec<SiteSetting>> {
        let mut tables = self.0.tables.write().await;
        let now = Utc::now();
        Ok(settings
            .into_iter()
            .map(|s| upsert_into(&mut tables.settings, s, now))
            .collect())
    }

    async fn delete(&self, setting_type: &str, key: &str) -> RepoResult<bool> {
        let mut tables = self.0.tables.write().await;
        Ok(tables
            .settings
            .remove(&(setting_type.to_string(), key.to_string()))
            .is_some())
    }
}

#[derive(Debug, Clone)]
pub struct MemoryCaptchaStore(MemoryStore);

#[async_trait]
impl CaptchaStore for MemoryCaptchaStore {
    async fn save(&self, challenge: &CaptchaChallenge) -> RepoResult<()> {
        let mut tables = self.0.tables.write().await;
        tables.captchas.insert(challenge.id, challenge.clone());
        Ok(())
    }

    async fn take(&self, id: Uuid) -> RepoResult<Option<CaptchaChallenge>> {
        let mut tables = self.0.tables.write().await;
        Ok(tables.captchas.remove(&id))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let mut tables = self.0.tables.write().await;
        let before = tables.captchas.len();
        tables.captchas.retain(|_, c| !c.is_expired(now));
        Ok((before - tables.captchas.len()) as u64)
    }
}
