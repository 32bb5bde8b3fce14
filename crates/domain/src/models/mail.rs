//! Free-form email relay request.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Payload of `POST /api/send-email`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    #[serde(default)]
    #[validate(length(min = 2, max = 200, message = "Subject must be 2-200 characters"))]
    pub subject: String,

    #[serde(default)]
    #[validate(length(min = 10, max = 10000, message = "Message must be at least 10 characters"))]
    pub body: String,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_captcha_answer"))]
    pub captcha: String,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_uuid"))]
    pub captcha_id: String,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: Option<String>,
}

/// Acknowledgement returned by mail-sending endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct SendEmailResponse {
    pub success: bool,
    pub message: String,
}
