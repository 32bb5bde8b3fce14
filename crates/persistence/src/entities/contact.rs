//! Contact submission entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::contact::{ContactStatus, ContactSubmission};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for contact_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "contact_status", rename_all = "lowercase")]
pub enum ContactStatusDb {
    New,
    Processing,
    Completed,
}

impl From<ContactStatusDb> for ContactStatus {
    fn from(db: ContactStatusDb) -> Self {
        match db {
            ContactStatusDb::New => ContactStatus::New,
            ContactStatusDb::Processing => ContactStatus::Processing,
            ContactStatusDb::Completed => ContactStatus::Completed,
        }
    }
}

impl From<ContactStatus> for ContactStatusDb {
    fn from(status: ContactStatus) -> Self {
        match status {
            ContactStatus::New => ContactStatusDb::New,
            ContactStatus::Processing => ContactStatusDb::Processing,
            ContactStatus::Completed => ContactStatusDb::Completed,
        }
    }
}

/// Database row mapping for the contact_submissions table.
#[derive(Debug, Clone, FromRow)]
pub struct ContactEntity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub status: ContactStatusDb,
    pub reply: Option<String>,
    pub privacy_agreed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ContactEntity> for ContactSubmission {
    fn from(entity: ContactEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            phone: entity.phone,
            message: entity.message,
            status: entity.status.into(),
            reply: entity.reply,
            privacy_agreed: entity.privacy_agreed,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Row with the window total, from `COUNT(*) OVER ()`.
#[derive(Debug, Clone, FromRow)]
pub struct ContactPageRow {
    #[sqlx(flatten)]
    pub contact: ContactEntity,
    pub total_count: i64,
}
