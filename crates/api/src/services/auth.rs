//! Staff authentication and account management.

use chrono::{Duration, Utc};
use domain::models::user::{LoginResponse, NewUser, User, UserChanges, UserResponse, UserRole};
use domain::repositories::{RepositoryError, UserRepository};
use shared::crypto::{constant_time_eq, random_hex, sha256_hex};
use shared::jwt::{JwtConfig, JwtError, SessionSubject};
use shared::password::{hash_password, verify_password, PasswordError};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Invitation links stay valid for a day.
pub const INVITATION_TTL_HOURS: i64 = 24;

/// Random bytes in a generated initial password.
const INITIAL_PASSWORD_BYTES: usize = 8;

/// Random bytes in a reset/invitation token.
const RESET_TOKEN_BYTES: usize = 32;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("Current password is incorrect")]
    WrongPassword,

    #[error("Email already in use")]
    EmailTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid site base URL: {0}")]
    InvalidLink(String),

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => AuthError::EmailTaken,
            other => AuthError::Repository(other),
        }
    }
}

/// A newly invited user and the link that lets them set a password.
#[derive(Debug, Clone)]
pub struct Invitation {
    pub user: User,
    pub link: String,
}

/// Admin edits to an account.
#[derive(Debug, Clone)]
pub struct AccountUpdate {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub password: Option<String>,
}

/// Login, password changes and account provisioning over a [`UserRepository`].
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: Arc<JwtConfig>,
    site_base_url: String,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: Arc<JwtConfig>, site_base_url: &str) -> Self {
        Self {
            users,
            jwt,
            site_base_url: site_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Checks credentials and issues a session token. Unknown email and wrong
    /// password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let (token, jti) = self.jwt.issue_session(&SessionSubject {
            user_id: user.id,
            email: &user.email,
            name: &user.name,
            role: user.role.as_str(),
        })?;

        tracing::info!(user_id = %user.id, jti = %jti, "User logged in");

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.session_expiry_secs,
            user: UserResponse::from(user),
        })
    }

    /// Completes an invitation or reset with the emailed token.
    pub async fn reset_password(
        &self,
        email: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        let (Some(stored_hash), Some(expires_at)) = (&user.reset_token_hash, user.reset_token_expires_at)
        else {
            return Err(AuthError::InvalidResetToken);
        };

        if expires_at <= Utc::now() || !constant_time_eq(stored_hash, &sha256_hex(token.trim())) {
            return Err(AuthError::InvalidResetToken);
        }

        let password_hash = hash_password(new_password)?;
        if !self.users.set_password(user.id, &password_hash, true).await? {
            return Err(AuthError::InvalidResetToken);
        }

        tracing::info!(user_id = %user.id, "Password set from reset token");
        Ok(())
    }

    /// Changes the signed-in user's own password.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(old_password, &user.password_hash)? {
            return Err(AuthError::WrongPassword);
        }

        let password_hash = hash_password(new_password)?;
        if !self.users.set_password(user.id, &password_hash, true).await? {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!(user_id = %user.id, "Password changed");
        Ok(())
    }

    /// Creates an account with a random password the user never sees and a
    /// reset token for the invitation link.
    pub async fn invite(
        &self,
        name: &str,
        email: &str,
        role: UserRole,
    ) -> Result<Invitation, AuthError> {
        let email = normalize_email(email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let initial_password = random_hex(INITIAL_PASSWORD_BYTES);
        let token = random_hex(RESET_TOKEN_BYTES);
        let link = self.reset_link(&email, &token)?;

        let user = self
            .users
            .create(NewUser {
                name: name.trim().to_string(),
                email,
                password_hash: hash_password(&initial_password)?,
                role,
                reset_token_hash: Some(sha256_hex(&token)),
                reset_token_expires_at: Some(Utc::now() + Duration::hours(INVITATION_TTL_HOURS)),
                has_changed_password: false,
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User invited");
        Ok(Invitation { user, link })
    }

    /// Applies admin edits; the email must stay unique.
    pub async fn update_account(&self, id: Uuid, update: AccountUpdate) -> Result<User, AuthError> {
        let email = normalize_email(&update.email);
        if let Some(existing) = self.users.find_by_email(&email).await? {
            if existing.id != id {
                return Err(AuthError::EmailTaken);
            }
        }

        let password_hash = match update.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        self.users
            .update(
                id,
                UserChanges {
                    name: Some(update.name.trim().to_string()),
                    email: Some(email),
                    role: Some(update.role),
                    password_hash,
                },
            )
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// `{site_base_url}/reset-password?email=..&token=..`
    pub fn reset_link(&self, email: &str, token: &str) -> Result<String, AuthError> {
        let base = format!("{}/reset-password", self.site_base_url);
        reqwest::Url::parse_with_params(&base, &[("email", email), ("token", token)])
            .map(String::from)
            .map_err(|e| AuthError::InvalidLink(e.to_string()))
    }
}

/// Emails are stored and compared lowercase.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;
    use fake::Fake;
    use persistence::memory::MemoryStore;

    const SECRET: &str = "test-secret-that-is-at-least-32-bytes-long";

    fn service() -> (AuthService, Arc<dyn UserRepository>) {
        let users: Arc<dyn UserRepository> = Arc::new(MemoryStore::new().users());
        let jwt = Arc::new(JwtConfig::new(SECRET, 3600, 30).unwrap());
        (AuthService::new(users.clone(), jwt, "https://site.example/"), users)
    }

    fn token_from(link: &str) -> String {
        let url = reqwest::Url::parse(link).unwrap();
        url.query_pairs()
            .find(|(k, _)| k == "token")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[tokio::test]
    async fn test_invite_then_reset_then_login() {
        let (svc, users) = service();
        let name: String = Name().fake();
        let email: String = SafeEmail().fake();

        let invitation = svc.invite(&name, &email.to_uppercase(), UserRole::Editor).await.unwrap();
        assert_eq!(invitation.user.email, email.to_lowercase());
        assert!(!invitation.user.has_changed_password);
        assert!(invitation.link.starts_with("https://site.example/reset-password?email="));

        let token = token_from(&invitation.link);
        assert_eq!(token.len(), RESET_TOKEN_BYTES * 2);
        assert_eq!(
            invitation.user.reset_token_hash.as_deref(),
            Some(sha256_hex(&token).as_str())
        );

        svc.reset_password(&email, &token, "new-password").await.unwrap();

        let stored = users.find_by_id(invitation.user.id).await.unwrap().unwrap();
        assert!(stored.has_changed_password);
        assert!(stored.reset_token_hash.is_none());

        let login = svc.login(&email, "new-password").await.unwrap();
        assert_eq!(login.token_type, "Bearer");
        assert_eq!(login.expires_in, 3600);
        assert_eq!(login.user.role, UserRole::Editor);
    }

    #[tokio::test]
    async fn test_reset_token_is_single_use() {
        let (svc, _) = service();
        let invitation = svc.invite("Lin", "lin@example.com", UserRole::Admin).await.unwrap();
        let token = token_from(&invitation.link);

        svc.reset_password("lin@example.com", &token, "first-pass").await.unwrap();
        assert!(matches!(
            svc.reset_password("lin@example.com", &token, "second-pass").await,
            Err(AuthError::InvalidResetToken)
        ));
    }

    #[tokio::test]
    async fn test_expired_reset_token_rejected() {
        let (svc, users) = service();
        let invitation = svc.invite("Lin", "lin@example.com", UserRole::Admin).await.unwrap();
        let token = token_from(&invitation.link);
        users
            .set_reset_token(invitation.user.id, &sha256_hex(&token), Utc::now() - Duration::minutes(1))
            .await
            .unwrap();

        assert!(matches!(
            svc.reset_password("lin@example.com", &token, "new-password").await,
            Err(AuthError::InvalidResetToken)
        ));
    }

    #[tokio::test]
    async fn test_wrong_reset_token_rejected() {
        let (svc, _) = service();
        svc.invite("Lin", "lin@example.com", UserRole::Admin).await.unwrap();
        assert!(matches!(
            svc.reset_password("lin@example.com", "deadbeef", "new-password").await,
            Err(AuthError::InvalidResetToken)
        ));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (svc, _) = service();
        let invitation = svc.invite("Lin", "lin@example.com", UserRole::Admin).await.unwrap();
        svc.reset_password("lin@example.com", &token_from(&invitation.link), "correct-horse")
            .await
            .unwrap();

        let wrong = svc.login("lin@example.com", "battery-staple").await.unwrap_err();
        let unknown = svc.login("nobody@example.com", "correct-horse").await.unwrap_err();
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));

        assert!(svc.login("  LIN@example.com ", "correct-horse").await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_invite_rejected() {
        let (svc, _) = service();
        svc.invite("Lin", "lin@example.com", UserRole::Admin).await.unwrap();
        assert!(matches!(
            svc.invite("Other", "LIN@example.com", UserRole::Editor).await,
            Err(AuthError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn test_change_password_checks_old_password() {
        let (svc, _) = service();
        let invitation = svc.invite("Lin", "lin@example.com", UserRole::Editor).await.unwrap();
        let id = invitation.user.id;
        svc.reset_password("lin@example.com", &token_from(&invitation.link), "old-pass")
            .await
            .unwrap();

        assert!(matches!(
            svc.change_password(id, "not-it", "new-pass").await,
            Err(AuthError::WrongPassword)
        ));

        svc.change_password(id, "old-pass", "new-pass").await.unwrap();
        assert!(svc.login("lin@example.com", "new-pass").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_account_email_conflict() {
        let (svc, _) = service();
        svc.invite("Lin", "lin@example.com", UserRole::Admin).await.unwrap();
        let other = svc.invite("Wu", "wu@example.com", UserRole::Editor).await.unwrap();

        let taken = svc
            .update_account(
                other.user.id,
                AccountUpdate {
                    name: "Wu".into(),
                    email: "Lin@Example.com".into(),
                    role: UserRole::Editor,
                    password: None,
                },
            )
            .await;
        assert!(matches!(taken, Err(AuthError::EmailTaken)));

        let updated = svc
            .update_account(
                other.user.id,
                AccountUpdate {
                    name: "Wu Ming".into(),
                    email: "wu@example.com".into(),
                    role: UserRole::Admin,
                    password: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Wu Ming");
        assert_eq!(updated.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_update_unknown_account() {
        let (svc, _) = service();
        let result = svc
            .update_account(
                Uuid::new_v4(),
                AccountUpdate {
                    name: "Ghost".into(),
                    email: "ghost@example.com".into(),
                    role: UserRole::Editor,
                    password: Some("secret1".into()),
                },
            )
            .await;
        assert!(matches!(result, Err(AuthError::UserNotFound)));
    }

    #[test]
    fn test_reset_link_encodes_email() {
        let (svc, _) = service();
        let link = svc.reset_link("a+b@example.com", "abc").unwrap();
        assert_eq!(
            link,
            "https://site.example/reset-password?email=a%2Bb%40example.com&token=abc"
        );
    }
}
