//! Contact form submission domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Handling state of a submission. Only staff move it forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    New,
    Processing,
    Completed,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::Processing => "processing",
            ContactStatus::Completed => "completed",
        }
    }
}

impl FromStr for ContactStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(ContactStatus::New),
            "processing" => Ok(ContactStatus::Processing),
            "completed" => Ok(ContactStatus::Completed),
            _ => Err(format!("Invalid contact status: {}", s)),
        }
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A message left through the public contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub status: ContactStatus,
    pub reply: Option<String>,
    pub privacy_agreed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContactSubmission {
    /// Reply text if one has been written.
    pub fn non_empty_reply(&self) -> Option<&str> {
        self.reply
            .as_deref()
            .filter(|r| !r.trim().is_empty())
    }
}

/// Input for inserting a submission; status starts at `new`.
#[derive(Debug, Clone)]
pub struct NewContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub privacy_agreed: bool,
}

/// Staff changes to a submission.
#[derive(Debug, Clone, Default)]
pub struct ContactChanges {
    pub status: Option<ContactStatus>,
    pub reply: Option<String>,
}

impl ContactChanges {
    pub fn apply(self, submission: &mut ContactSubmission) {
        if let Some(status) = self.status {
            submission.status = status;
        }
        if let Some(reply) = self.reply {
            submission.reply = Some(reply);
        }
    }

    /// Whether applying these changes should send the reply to the submitter.
    ///
    /// True only when this update sets the status to `completed` and the
    /// stored reply afterwards is non-empty.
    pub fn completes_with_reply(&self, updated: &ContactSubmission) -> bool {
        self.status == Some(ContactStatus::Completed) && updated.non_empty_reply().is_some()
    }
}

fn validate_agreed(agreed: &bool) -> Result<(), validator::ValidationError> {
    if *agreed {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("privacy");
        err.message = Some("You must agree to the privacy policy".into());
        Err(err)
    }
}

/// Public contact form payload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    #[serde(default)]
    #[validate(
        custom(function = "shared::validation::validate_not_blank"),
        length(max = 100, message = "Name must be at most 100 characters")
    )]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: String,

    #[serde(default)]
    #[validate(
        custom(function = "shared::validation::validate_not_blank"),
        length(max = 5000, message = "Message must be at most 5000 characters")
    )]
    pub message: String,

    #[serde(default)]
    #[validate(custom(function = "validate_agreed"))]
    pub privacy_agreed: bool,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_uuid"))]
    pub captcha_id: String,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_captcha_answer"))]
    pub captcha: String,
}

impl CreateContactRequest {
    pub fn to_new_submission(&self) -> NewContactSubmission {
        NewContactSubmission {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: self.phone.trim().to_string(),
            message: self.message.trim().to_string(),
            privacy_agreed: self.privacy_agreed,
        }
    }
}

/// Admin PATCH payload, id carried in the body.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactRequest {
    pub id: Option<Uuid>,

    pub status: Option<ContactStatus>,

    #[validate(length(max = 5000, message = "Reply must be at most 5000 characters"))]
    pub reply: Option<String>,
}

impl UpdateContactRequest {
    pub fn into_parts(self) -> (Option<Uuid>, ContactChanges) {
        (
            self.id,
            ContactChanges {
                status: self.status,
                reply: self.reply,
            },
        )
    }
}

/// Query parameters for the admin listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactListQuery {
    pub status: Option<ContactStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Free-text search over name, email, phone and message.
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paged admin listing.
#[derive(Debug, Clone, Serialize)]
pub struct ContactListResponse {
    pub data: Vec<ContactSubmission>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
