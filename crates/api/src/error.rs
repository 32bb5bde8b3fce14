use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::repositories::RepositoryError;
use domain::services::CaptchaError;
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::AuthError;
use crate::services::blob_storage::BlobError;
use crate::services::email::EmailError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Field-level validation failures.
    #[error("Validation error: {message}")]
    InvalidFields {
        message: String,
        details: Vec<ValidationDetail>,
    },

    /// A pairwise move has no neighbour in the requested direction.
    #[error("Boundary reached")]
    BoundaryReached,

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<ValidationDetail>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) | ApiError::InvalidFields { .. } | ApiError::BoundaryReached => {
                StatusCode::BAD_REQUEST
            }
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Validation(_) | ApiError::InvalidFields { .. } => "validation_error",
            ApiError::BoundaryReached => "boundary_reached",
            ApiError::RateLimited => "rate_limited",
            ApiError::Internal(_) => "internal_error",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match self {
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Validation(msg)
            | ApiError::ServiceUnavailable(msg) => (msg, None),
            ApiError::InvalidFields { message, details } => (message, Some(details)),
            ApiError::BoundaryReached => ("boundary reached".to_string(), None),
            ApiError::RateLimited => ("Too many requests. Please try again later.".to_string(), None),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ("An internal error occurred".to_string(), None)
            }
        };

        let body = ErrorBody {
            error: message,
            code,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ApiError::NotFound("Resource not found".into()),
            RepositoryError::Conflict(msg) => ApiError::Conflict(msg),
            RepositoryError::InvalidReference(_) => {
                ApiError::NotFound("Referenced resource not found".into())
            }
            RepositoryError::Database(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<CaptchaError> for ApiError {
    fn from(err: CaptchaError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<EmailError> for ApiError {
    fn from(err: EmailError) -> Self {
        ApiError::Internal(format!("Email delivery failed: {}", err))
    }
}

impl From<BlobError> for ApiError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::Disabled => ApiError::ServiceUnavailable("File storage is not configured".into()),
            BlobError::TooLarge { limit } => {
                ApiError::Validation(format!("File exceeds the {} byte upload limit", limit))
            }
            other => ApiError::Internal(format!("Blob storage failed: {}", other)),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::Unauthorized("Invalid email or password".into()),
            AuthError::InvalidResetToken => ApiError::Validation("Invalid or expired token".into()),
            AuthError::WrongPassword => ApiError::Validation("Current password is incorrect".into()),
            AuthError::EmailTaken => ApiError::Validation("email already in use".into()),
            AuthError::UserNotFound => ApiError::NotFound("User not found".into()),
            AuthError::Repository(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationDetail {
                    field: camel_case(field),
                    message: e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {}", camel_case(field))),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        let message = if details.len() == 1 {
            details[0].message.clone()
        } else {
            format!("{} validation errors", details.len())
        };

        ApiError::InvalidFields { message, details }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// Rust field names to the camelCase used on the wire.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_api_error_statuses() {
        let cases = [
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::BoundaryReached, StatusCode::BAD_REQUEST),
            (ApiError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::ServiceUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_unauthorized_body_has_error_string() {
        let body = body_json(ApiError::Unauthorized("Authentication required".into()).into_response()).await;
        assert_eq!(body["error"], "Authentication required");
        assert_eq!(body["code"], "unauthorized");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_boundary_body() {
        let body = body_json(ApiError::BoundaryReached.into_response()).await;
        assert_eq!(body["error"], "boundary reached");
        assert_eq!(body["code"], "boundary_reached");
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let body = body_json(ApiError::Internal("connection refused on 10.0.0.3".into()).into_response()).await;
        assert_eq!(body["error"], "An internal error occurred");
        assert!(!body.to_string().contains("10.0.0.3"));
    }

    #[test]
    fn test_repository_errors_map_to_statuses() {
        assert_eq!(ApiError::from(RepositoryError::NotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(RepositoryError::InvalidReference("project".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(RepositoryError::Conflict("email".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(RepositoryError::Database("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_blob_disabled_is_unavailable() {
        assert_eq!(ApiError::from(BlobError::Disabled).status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ApiError::from(BlobError::TooLarge { limit: 10 }).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[derive(Validate)]
    struct Form {
        #[validate(length(min = 2, message = "Name is too short"))]
        display_name: String,
        #[validate(email(message = "Invalid email address"))]
        email: String,
    }

    #[tokio::test]
    async fn test_validation_errors_list_fields_in_camel_case() {
        let errors = Form {
            display_name: "x".into(),
            email: "nope".into(),
        }
        .validate()
        .unwrap_err();

        let body = body_json(ApiError::from(errors).into_response()).await;
        assert_eq!(body["error"], "2 validation errors");
        assert_eq!(body["details"][0]["field"], "displayName");
        assert_eq!(body["details"][0]["message"], "Name is too short");
        assert_eq!(body["details"][1]["field"], "email");
    }

    #[test]
    fn test_single_validation_error_uses_its_message() {
        let errors = Form {
            display_name: "Lin".into(),
            email: "nope".into(),
        }
        .validate()
        .unwrap_err();

        match ApiError::from(errors) {
            ApiError::InvalidFields { message, details } => {
                assert_eq!(message, "Invalid email address");
                assert_eq!(details.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("image_url"), "imageUrl");
        assert_eq!(camel_case("privacy_agreed"), "privacyAgreed");
        assert_eq!(camel_case("title"), "title");
    }
}
