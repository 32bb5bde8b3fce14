//! Staff account domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Staff role. Editors manage content; admins also manage accounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Admin,
    Editor,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Editor => "editor",
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "editor" => Ok(UserRole::Editor),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A staff account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Stored lowercase; unique.
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    /// SHA-256 of the outstanding reset/invitation token.
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub has_changed_password: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub has_changed_password: bool,
}

/// Profile changes made by an admin.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(hash) = self.password_hash {
            user.password_hash = hash;
        }
    }
}

/// User as returned by the API; never carries password material.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub has_changed_password: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            has_changed_password: u.has_changed_password,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Request payload for inviting a user.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    pub role: Option<UserRole>,
}

/// Request payload for editing a user; id carried in the body.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub id: Option<Uuid>,

    #[serde(default)]
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(required(message = "Role is required"))]
    pub role: Option<UserRole>,

    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: Option<String>,
}

/// Request payload for changing one's own password.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Current password is required"))]
    pub old_password: String,

    #[serde(default)]
    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub new_password: String,
}

/// Credential login payload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Completes an invitation or reset using the emailed token.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[serde(default)]
    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub new_password: String,
}

/// `?id=` for delete endpoints that take the id as a query parameter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Chen".into(),
            email: "chen@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            role: UserRole::Editor,
            reset_token_hash: Some("abc".into()),
            reset_token_expires_at: None,
            has_changed_password: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_serialization_hides_secrets() {
        let value = serde_json::to_value(user()).unwrap();
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("resetTokenHash").is_none());
        assert_eq!(value["role"], "editor");
    }

    #[test]
    fn test_response_from_user() {
        let value = serde_json::to_value(UserResponse::from(user())).unwrap();
        assert_eq!(value["hasChangedPassword"], false);
        assert!(value.get("passwordHash").is_none());
    }

    #[test]
    fn test_create_user_validation() {
        let ok: CreateUserRequest =
            serde_json::from_value(json!({ "name": "Wu", "email": "wu@example.com" })).unwrap();
        assert!(ok.validate().is_ok());
        assert!(ok.role.is_none());

        let bad: CreateUserRequest =
            serde_json::from_value(json!({ "name": "W", "email": "nope" })).unwrap();
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_unknown_role_rejected_by_serde() {
        let result = serde_json::from_value::<CreateUserRequest>(
            json!({ "name": "Wu", "email": "wu@example.com", "role": "owner" }),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("ADMIN".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("root".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_change_password_requires_min_length() {
        let req: ChangePasswordRequest =
            serde_json::from_value(json!({ "oldPassword": "old", "newPassword": "12345" })).unwrap();
        assert!(req.validate().unwrap_err().field_errors().contains_key("new_password"));
    }
}
