//! Admin bootstrap service for initial setup.
//!
//! Creates the first admin user on startup if configured via environment variables.
//! Idempotent: nothing happens when a user with the configured email exists.

use domain::models::user::{NewUser, UserRole};
use domain::repositories::{RepositoryError, UserRepository};
use shared::password::{hash_password, PasswordError};
use tracing::{info, warn};

use crate::config::AdminConfig;
use crate::services::auth::normalize_email;

/// Error types for admin bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordError),
}

/// What [`bootstrap_admin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    NotConfigured,
    AlreadyExists,
    Created,
}

/// Bootstrap the admin user if configured and not already present.
///
/// Called after migrations on startup.
pub async fn bootstrap_admin(
    users: &dyn UserRepository,
    config: &AdminConfig,
) -> Result<BootstrapOutcome, BootstrapError> {
    if config.email.trim().is_empty() {
        return Ok(BootstrapOutcome::NotConfigured);
    }

    if config.password.is_empty() {
        warn!("BL__ADMIN__EMAIL is set but BL__ADMIN__PASSWORD is empty - skipping bootstrap");
        return Ok(BootstrapOutcome::NotConfigured);
    }

    let email = normalize_email(&config.email);
    if users.find_by_email(&email).await?.is_some() {
        info!(email = %email, "Bootstrap admin already exists - skipping");
        return Ok(BootstrapOutcome::AlreadyExists);
    }

    let user = users
        .create(NewUser {
            name: config.name.clone(),
            email,
            password_hash: hash_password(&config.password)?,
            role: UserRole::Admin,
            reset_token_hash: None,
            reset_token_expires_at: None,
            has_changed_password: false,
        })
        .await?;

    info!(email = %user.email, user_id = %user.id, "Bootstrap admin user created");
    warn!("SECURITY: Remove BL__ADMIN__PASSWORD from configuration after initial setup");

    Ok(BootstrapOutcome::Created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::memory::MemoryStore;
    use shared::password::verify_password;

    fn config(email: &str, password: &str) -> AdminConfig {
        AdminConfig {
            email: email.into(),
            password: password.into(),
            name: "Administrator".into(),
        }
    }

    #[tokio::test]
    async fn test_creates_admin_once() {
        let users = MemoryStore::new().users();
        let cfg = config("Owner@Example.com", "bootstrap-pass");

        assert_eq!(bootstrap_admin(&users, &cfg).await.unwrap(), BootstrapOutcome::Created);
        assert_eq!(
            bootstrap_admin(&users, &cfg).await.unwrap(),
            BootstrapOutcome::AlreadyExists
        );

        let admin = users.find_by_email("owner@example.com").await.unwrap().unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        assert!(verify_password("bootstrap-pass", &admin.password_hash).unwrap());
        assert_eq!(users.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_skips_when_not_configured() {
        let users = MemoryStore::new().users();
        assert_eq!(
            bootstrap_admin(&users, &config("", "")).await.unwrap(),
            BootstrapOutcome::NotConfigured
        );
        assert_eq!(
            bootstrap_admin(&users, &config("owner@example.com", "")).await.unwrap(),
            BootstrapOutcome::NotConfigured
        );
        assert!(users.list().await.unwrap().is_empty());
    }
}
