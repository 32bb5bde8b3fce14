//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::user::{User, UserRole};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for user_role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRoleDb {
    Admin,
    Editor,
}

impl From<UserRoleDb> for UserRole {
    fn from(db: UserRoleDb) -> Self {
        match db {
            UserRoleDb::Admin => UserRole::Admin,
            UserRoleDb::Editor => UserRole::Editor,
        }
    }
}

impl From<UserRole> for UserRoleDb {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => UserRoleDb::Admin,
            UserRole::Editor => UserRoleDb::Editor,
        }
    }
}

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRoleDb,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub has_changed_password: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            password_hash: entity.password_hash,
            role: entity.role.into(),
            reset_token_hash: entity.reset_token_hash,
            reset_token_expires_at: entity.reset_token_expires_at,
            has_changed_password: entity.has_changed_password,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
