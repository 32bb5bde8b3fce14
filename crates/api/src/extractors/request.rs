//! Request extractors that reject with [`ApiError`] instead of axum's
//! plain-text defaults.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// JSON body. Malformed JSON, missing required fields and unknown enum
/// values become 400 `validation_error`.
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Path parameters. A malformed UUID becomes 400.
#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);

/// Query string parameters.
#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::{get, post},
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;
    use uuid::Uuid;

    #[derive(Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        title: String,
    }

    async fn create(AppJson(_): AppJson<Payload>) -> StatusCode {
        StatusCode::CREATED
    }

    async fn show(AppPath(_id): AppPath<Uuid>) -> StatusCode {
        StatusCode::OK
    }

    fn router() -> Router {
        Router::new()
            .route("/items", post(create))
            .route("/items/:id", get(show))
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let response = router()
            .oneshot(
                Request::post("/items")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let response = router()
            .oneshot(
                Request::post("/items")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"title":"Demo"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_malformed_uuid_is_bad_request() {
        let response = router()
            .oneshot(Request::get("/items/not-a-uuid").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
