//! Integration tests for session enforcement on mutating routes.
//!
//! Tests cover:
//! - Every admin or mutating route answers 401 without a valid session
//! - A rejected request leaves every admin listing unchanged

mod common;

use axum::http::{Method, StatusCode};
use common::{create_project, TestApp};
use serde_json::{json, Value};

/// Ids of one record per aggregate, seeded through the API.
struct Seeded {
    project: String,
    document: String,
    slide: String,
    contact: String,
    user: String,
}

async fn seed(app: &TestApp, token: &str) -> Seeded {
    let first = create_project(app, token, "Riverside", "new").await;
    create_project(app, token, "Hillside", "new").await;
    let project = first["id"].as_str().unwrap().to_string();

    let (status, document) = app
        .json(
            Method::POST,
            "/api/documents/admin",
            Some(token),
            json!({
                "title": "Floor plans",
                "fileUrl": "/uploads/floor-plans.pdf",
                "fileType": "pdf",
                "category": "plans",
                "projectId": project
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", document);

    let (status, slide) = app
        .json(
            Method::POST,
            "/api/carousel",
            Some(token),
            json!({"title": "Welcome", "imageUrl": "/slides/welcome.jpg"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", slide);

    let (captcha_id, code) = app.captcha().await;
    let (status, contact) = app
        .json(
            Method::POST,
            "/api/contacts",
            None,
            json!({
                "name": "Lin",
                "email": "lin@example.com",
                "phone": "0912-345-678",
                "message": "Is the riverside show flat open on Sunday?",
                "privacyAgreed": true,
                "captchaId": captcha_id,
                "captcha": code
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", contact);

    let (status, setting) = app
        .json(
            Method::POST,
            "/api/settings",
            Some(token),
            json!({"type": "seo", "key": "title", "value": "Banglong Construction"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", setting);

    let (user, _) = app
        .create_user("lin.wei@banglong.test", domain::models::user::UserRole::Editor)
        .await;

    Seeded {
        project,
        document: document["document"]["id"].as_str().unwrap().to_string(),
        slide: slide["carousel"]["id"].as_str().unwrap().to_string(),
        contact: contact["data"]["id"].as_str().unwrap().to_string(),
        user: user.id.to_string(),
    }
}

/// Every admin listing, read with a valid admin session.
async fn snapshot(app: &TestApp, admin: &str) -> Vec<Value> {
    let mut listings = Vec::new();
    for uri in [
        "/api/projects/admin",
        "/api/documents/admin",
        "/api/carousel/admin",
        "/api/contacts/admin",
        "/api/settings",
        "/api/users",
    ] {
        let (status, body) = app.get(uri, Some(admin)).await;
        assert_eq!(status, StatusCode::OK, "{} failed: {}", uri, body);
        listings.push(body);
    }
    listings
}

fn mutating_requests(ids: &Seeded) -> Vec<(Method, String, Value)> {
    let project = format!("/api/projects/{}", ids.project);
    let slide = format!("/api/carousel/{}", ids.slide);

    vec![
        (
            Method::POST,
            "/api/projects/admin".to_string(),
            json!({"title": "Intruder", "category": "new", "imageUrl": "/x.jpg"}),
        ),
        (Method::PUT, project.clone(), json!({"title": "Renamed"})),
        (Method::DELETE, project.clone(), Value::Null),
        (
            Method::POST,
            "/api/projects/reorder".to_string(),
            json!({"items": [{"id": ids.project}]}),
        ),
        (
            Method::POST,
            format!("{}/move", project),
            json!({"direction": "down"}),
        ),
        (
            Method::POST,
            "/api/documents/admin".to_string(),
            json!({"title": "Intruder", "fileUrl": "/x.pdf", "fileType": "pdf", "category": "plans"}),
        ),
        (
            Method::PATCH,
            "/api/documents/admin".to_string(),
            json!({"id": ids.document, "title": "Renamed"}),
        ),
        (
            Method::DELETE,
            format!("/api/documents/admin?id={}", ids.document),
            Value::Null,
        ),
        (
            Method::POST,
            "/api/carousel".to_string(),
            json!({"title": "Intruder", "imageUrl": "/x.jpg"}),
        ),
        (Method::PATCH, slide.clone(), json!({"title": "Renamed"})),
        (Method::DELETE, slide, Value::Null),
        (
            Method::POST,
            "/api/carousel/reorder".to_string(),
            json!({"id": ids.slide, "direction": "down"}),
        ),
        (
            Method::PUT,
            "/api/carousel/reorder".to_string(),
            json!({"items": [{"id": ids.slide}]}),
        ),
        (
            Method::PATCH,
            "/api/contacts/admin".to_string(),
            json!({"id": ids.contact, "status": "completed", "reply": "Yes"}),
        ),
        (
            Method::DELETE,
            format!("/api/contacts/admin?id={}", ids.contact),
            Value::Null,
        ),
        (
            Method::POST,
            "/api/settings".to_string(),
            json!({"type": "seo", "key": "title", "value": "Defaced"}),
        ),
        (
            Method::PUT,
            "/api/settings".to_string(),
            json!({"settings": [{"type": "seo", "key": "title", "value": "Defaced"}]}),
        ),
        (
            Method::DELETE,
            "/api/settings?type=seo&key=title".to_string(),
            Value::Null,
        ),
        (
            Method::POST,
            "/api/users".to_string(),
            json!({"name": "Intruder", "email": "intruder@banglong.test"}),
        ),
        (
            Method::PUT,
            "/api/users".to_string(),
            json!({"id": ids.user, "name": "Renamed", "email": "lin.wei@banglong.test", "role": "admin"}),
        ),
        (
            Method::DELETE,
            format!("/api/users?id={}", ids.user),
            Value::Null,
        ),
        (
            Method::POST,
            "/api/users/change-password".to_string(),
            json!({"oldPassword": common::TEST_PASSWORD, "newPassword": "taken-over"}),
        ),
    ]
}

#[tokio::test]
async fn test_mutating_routes_reject_missing_or_invalid_session() {
    let app = TestApp::new();
    let editor = app.editor_token().await;
    let admin = app.admin_token().await;
    let ids = seed(&app, &editor).await;

    let before = snapshot(&app, &admin).await;
    let mails_before = app.mailer.sent().len();

    for token in [None, Some("not-a-session-token")] {
        for (method, uri, body) in mutating_requests(&ids) {
            let (status, response) = if body.is_null() {
                app.send(common::request(method.clone(), &uri, token, None))
                    .await
            } else {
                app.json(method.clone(), &uri, token, body).await
            };
            assert_eq!(
                status,
                StatusCode::UNAUTHORIZED,
                "{} {} with token {:?}: {}",
                method,
                uri,
                token,
                response
            );
            assert_eq!(response["code"], "unauthorized");
        }
    }

    assert_eq!(snapshot(&app, &admin).await, before);
    assert_eq!(app.mailer.sent().len(), mails_before);

    let (status, _) = app
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({"email": "editor@banglong.test", "password": common::TEST_PASSWORD}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_editor_session_cannot_manage_users() {
    let app = TestApp::new();
    let editor = app.editor_token().await;
    let admin = app.admin_token().await;
    let ids = seed(&app, &editor).await;
    let before = snapshot(&app, &admin).await;
    let mails_before = app.mailer.sent().len();

    let requests = [
        (
            Method::POST,
            "/api/users".to_string(),
            json!({"name": "Intruder", "email": "intruder@banglong.test"}),
        ),
        (
            Method::PUT,
            "/api/users".to_string(),
            json!({"id": ids.user, "name": "Renamed", "email": "lin.wei@banglong.test", "role": "admin"}),
        ),
    ];
    for (method, uri, body) in requests {
        let (status, _) = app.json(method, &uri, Some(&editor), body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, _) = app
        .delete(&format!("/api/users?id={}", ids.user), Some(&editor))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(snapshot(&app, &admin).await, before);
    assert_eq!(app.mailer.sent().len(), mails_before);
}
