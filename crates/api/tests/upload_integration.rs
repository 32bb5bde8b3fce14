//! Integration tests for the upload proxy.
//!
//! Tests cover:
//! - POST /api/upload?filename= (auth, validation, size limit, storage)

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use banglong_api::app::{create_app, AppState};
use banglong_api::services::blob_storage::DisabledBlobStore;
use common::{parse_response_body, RecordingMailer, TestApp};
use persistence::Repositories;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "banglong-test-boundary";

fn multipart_body(field: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"; filename=\"ignored.bin\"\r\nContent-Type: {ct}\r\n\r\n",
        b = BOUNDARY,
        f = field,
        ct = content_type,
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(uri: &str, token: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn test_upload_requires_session() {
    let app = TestApp::new();
    let body = multipart_body("file", "image/png", b"png-bytes");

    let (status, _) = app
        .send(upload_request("/api/upload?filename=a.png", None, body))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.blobs.objects().is_empty());
}

#[tokio::test]
async fn test_upload_stores_sanitized_object() {
    let app = TestApp::new();
    let token = app.editor_token().await;
    let body = multipart_body("file", "application/octet-stream", b"png-bytes");

    let (status, stored) = app
        .send(upload_request(
            "/api/upload?filename=my%20photo.png",
            Some(&token),
            body,
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", stored);

    let pathname = stored["pathname"].as_str().unwrap();
    assert!(pathname.starts_with("uploads/"));
    assert!(pathname.ends_with("-my_photo.png"));
    assert_eq!(stored["url"], format!("https://blobs.test/{}", pathname));
    assert_eq!(stored["contentType"], "image/png");
    assert_eq!(stored["size"], 9);

    let objects = app.blobs.objects();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].0, pathname);
    assert_eq!(&objects[0].2[..], b"png-bytes");
}

#[tokio::test]
async fn test_upload_requires_filename_and_file() {
    let app = TestApp::new();
    let token = app.editor_token().await;

    let (status, body) = app
        .send(upload_request(
            "/api/upload",
            Some(&token),
            multipart_body("file", "image/png", b"x"),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "filename is required");

    let (status, body) = app
        .send(upload_request(
            "/api/upload?filename=a.png",
            Some(&token),
            multipart_body("attachment", "image/png", b"x"),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "file is required");
}

#[tokio::test]
async fn test_upload_size_limit() {
    let app = TestApp::new();
    let token = app.editor_token().await;
    let oversized = vec![b'a'; 2048];

    let (status, _) = app
        .send(upload_request(
            "/api/upload?filename=big.txt",
            Some(&token),
            multipart_body("file", "text/plain", &oversized),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.blobs.objects().is_empty());
}

#[tokio::test]
async fn test_upload_unavailable_without_storage() {
    let config = common::test_config();
    let state = AppState::new(
        config,
        Repositories::in_memory(),
        Arc::new(RecordingMailer::default()),
        Arc::new(DisabledBlobStore),
    )
    .unwrap();
    let app = TestApp {
        router: create_app(state.clone()),
        state,
        mailer: Arc::new(RecordingMailer::default()),
        blobs: Arc::default(),
    };
    let token = app.editor_token().await;

    let response = app
        .router
        .clone()
        .oneshot(upload_request(
            "/api/upload?filename=a.png",
            Some(&token),
            multipart_body("file", "image/png", b"x"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = parse_response_body(response).await;
    assert_eq!(body["code"], "service_unavailable");
}
