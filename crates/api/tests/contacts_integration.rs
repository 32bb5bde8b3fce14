//! Integration tests for the contact form and its admin endpoints.
//!
//! Tests cover:
//! - GET /api/captcha
//! - POST /api/contacts (captcha, validation, staff notification)
//! - GET/PATCH/DELETE /api/contacts/admin (filters, reply notification)

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::{json, Value};

fn form(captcha_id: &str, captcha: &str) -> Value {
    json!({
        "name": "Lin",
        "email": "Lin@Example.com",
        "phone": "0912-345-678",
        "message": "Please call me about the riverside units",
        "privacyAgreed": true,
        "captchaId": captcha_id,
        "captcha": captcha
    })
}

async fn submit(app: &TestApp) -> Value {
    let (captcha_id, code) = app.captcha().await;
    let (status, body) = app
        .json(Method::POST, "/api/contacts", None, form(&captcha_id, &code))
        .await;
    assert_eq!(status, StatusCode::CREATED, "submit failed: {}", body);
    body["data"].clone()
}

// =============================================================================
// Captcha
// =============================================================================

#[tokio::test]
async fn test_captcha_returns_png_data_url() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/captcha", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["captchaImage"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
    assert_eq!(body["code"].as_str().unwrap().len(), 4);
}

#[tokio::test]
async fn test_captcha_code_hidden_by_default() {
    let mut config = common::test_config();
    config.captcha.expose_code = false;
    let app = TestApp::with_config(config);

    let (status, body) = app.get("/api/captcha", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("code").is_none());
}

// =============================================================================
// Submission
// =============================================================================

#[tokio::test]
async fn test_submit_stores_and_notifies() {
    let app = TestApp::new();
    let data = submit(&app).await;

    assert_eq!(data["status"], "new");
    assert_eq!(data["email"], "lin@example.com");

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["office@banglong.test"]);
    assert!(sent[0].body_text.contains("riverside units"));
}

#[tokio::test]
async fn test_submit_uses_configured_receivers_and_template() {
    let app = TestApp::new();
    let token = app.editor_token().await;

    let (status, _) = app
        .json(
            Method::PUT,
            "/api/settings",
            Some(&token),
            json!({"settings": [
                {"type": "email", "key": "receivers", "value": ["sales@banglong.test", "pm@banglong.test"]},
                {"type": "email", "key": "notificationTemplate", "value": "{{name}} <{{email}}>: {{message}}"}
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    submit(&app).await;

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["sales@banglong.test", "pm@banglong.test"]);
    assert_eq!(
        sent[0].body_text,
        "Lin <lin@example.com>: Please call me about the riverside units"
    );
}

#[tokio::test]
async fn test_wrong_captcha_rejected_and_consumed() {
    let app = TestApp::new();
    let (captcha_id, code) = app.captcha().await;
    let wrong = if code == "1000" { "1001" } else { "1000" };

    let (status, body) = app
        .json(Method::POST, "/api/contacts", None, form(&captcha_id, wrong))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid captcha");

    // The challenge is single use, even after a failed attempt.
    let (status, _) = app
        .json(Method::POST, "/api/contacts", None, form(&captcha_id, &code))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_captcha_cannot_be_replayed() {
    let app = TestApp::new();
    let (captcha_id, code) = app.captcha().await;

    let (status, _) = app
        .json(Method::POST, "/api/contacts", None, form(&captcha_id, &code))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .json(Method::POST, "/api/contacts", None, form(&captcha_id, &code))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_privacy_and_field_validation() {
    let app = TestApp::new();
    let (captcha_id, code) = app.captcha().await;

    let mut body = form(&captcha_id, &code);
    body["privacyAgreed"] = json!(false);
    body["email"] = json!("nope");

    let (status, response) = app.json(Method::POST, "/api/contacts", None, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = response["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "privacyAgreed"]);

    let (_, list) = app.get("/api/contacts/admin", Some(&app.editor_token().await)).await;
    assert_eq!(list["total"], 0);
}

#[tokio::test]
async fn test_submit_accepts_area_code_in_parentheses() {
    let app = TestApp::new();
    let (captcha_id, code) = app.captcha().await;

    let mut body = form(&captcha_id, &code);
    body["phone"] = json!("(02) 2345-6789");

    let (status, response) = app.json(Method::POST, "/api/contacts", None, body).await;
    assert_eq!(status, StatusCode::CREATED, "{}", response);
    assert_eq!(response["data"]["phone"], "(02) 2345-6789");
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_submission() {
    let app = TestApp::new();
    app.mailer.fail_all();

    let data = submit(&app).await;
    assert_eq!(data["status"], "new");
}

// =============================================================================
// Admin
// =============================================================================

#[tokio::test]
async fn test_admin_list_requires_session_and_pages() {
    let app = TestApp::new();
    for _ in 0..3 {
        submit(&app).await;
    }

    let (status, _) = app.get("/api/contacts/admin", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.editor_token().await;
    let (status, body) = app
        .get("/api/contacts/admin?limit=2&offset=0", Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = app
        .get("/api/contacts/admin?status=completed", Some(&token))
        .await;
    assert_eq!(body["total"], 0);

    let (_, body) = app.get("/api/contacts/admin?q=RIVERSIDE", Some(&token)).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["limit"], 100);
}

#[tokio::test]
async fn test_completing_with_reply_emails_submitter_once() {
    let app = TestApp::new();
    let contact = submit(&app).await;
    let token = app.editor_token().await;

    let (status, body) = app
        .json(
            Method::PATCH,
            "/api/contacts/admin",
            Some(&token),
            json!({"id": contact["id"], "status": "processing", "reply": "Draft <b>reply</b>\nLine two"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "processing");
    assert_eq!(app.mailer.sent().len(), 1);

    let (status, body) = app
        .json(
            Method::PATCH,
            "/api/contacts/admin",
            Some(&token),
            json!({"id": contact["id"], "status": "completed"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 2);
    let reply = &sent[1];
    assert_eq!(reply.to, vec!["lin@example.com"]);
    assert!(reply.body_text.contains("Draft <b>reply</b>\nLine two"));
    assert!(reply
        .body_html
        .as_deref()
        .unwrap()
        .contains("Draft &lt;b&gt;reply&lt;/b&gt;<br>Line two"));
}

#[tokio::test]
async fn test_completing_without_reply_sends_nothing() {
    let app = TestApp::new();
    let contact = submit(&app).await;
    let token = app.editor_token().await;

    let (status, _) = app
        .json(
            Method::PATCH,
            "/api/contacts/admin",
            Some(&token),
            json!({"id": contact["id"], "status": "completed", "reply": "   "}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.mailer.sent().len(), 1);
}

#[tokio::test]
async fn test_reply_failure_still_updates() {
    let app = TestApp::new();
    let contact = submit(&app).await;
    let token = app.editor_token().await;
    app.mailer.fail_all();

    let (status, body) = app
        .json(
            Method::PATCH,
            "/api/contacts/admin",
            Some(&token),
            json!({"id": contact["id"], "status": "completed", "reply": "We will call you"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["reply"], "We will call you");
}

#[tokio::test]
async fn test_patch_and_delete_errors() {
    let app = TestApp::new();
    let token = app.editor_token().await;

    let (status, _) = app
        .json(Method::PATCH, "/api/contacts/admin", Some(&token), json!({"status": "completed"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::PATCH,
            "/api/contacts/admin",
            Some(&token),
            json!({"id": uuid::Uuid::new_v4(), "status": "completed"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let contact = submit(&app).await;
    let uri = format!("/api/contacts/admin?id={}", contact["id"].as_str().unwrap());
    let (status, body) = app.delete(&uri, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = app.delete(&uri, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
