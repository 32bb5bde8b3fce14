//! Integration tests for project showcase endpoints.
//!
//! Tests cover:
//! - GET /api/projects, GET /api/projects/:id (public views)
//! - POST/GET /api/projects/admin
//! - PUT/DELETE /api/projects/:id
//! - POST /api/projects/reorder
//! - POST /api/projects/:id/move

mod common;

use axum::http::{Method, StatusCode};
use common::{create_project, TestApp};
use serde_json::json;

// =============================================================================
// Creation and ordering
// =============================================================================

#[tokio::test]
async fn test_create_requires_session() {
    let app = TestApp::new();

    let (status, body) = app
        .json(
            Method::POST,
            "/api/projects/admin",
            None,
            json!({"title": "Riverside", "category": "new", "imageUrl": "/a.jpg"}),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
async fn test_create_appends_within_category() {
    let app = TestApp::new();
    let token = app.editor_token().await;

    let first = create_project(&app, &token, "Riverside", "new").await;
    let second = create_project(&app, &token, "Hilltop", "new").await;
    let classic = create_project(&app, &token, "Old Town", "classic").await;

    assert_eq!(first["order"], 1);
    assert_eq!(second["order"], 2);
    assert_eq!(classic["order"], 1);
}

#[tokio::test]
async fn test_create_validation_errors() {
    let app = TestApp::new();
    let token = app.editor_token().await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/projects/admin",
            Some(&token),
            json!({"title": "  ", "imageUrl": "not a url"}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"title"));
    assert!(fields.contains(&"category"));
    assert!(fields.contains(&"imageUrl"));
}

// =============================================================================
// Public visibility
// =============================================================================

#[tokio::test]
async fn test_inactive_project_hidden_from_public() {
    let app = TestApp::new();
    let token = app.editor_token().await;

    let project = create_project(&app, &token, "Draft", "future").await;
    let id = project["id"].as_str().unwrap();

    let (status, _) = app
        .json(Method::PUT, &format!("/api/projects/{}", id), Some(&token), json!({"isActive": false}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = app.get("/api/projects?category=future", None).await;
    assert!(list["projects"].as_array().unwrap().is_empty());

    let (status, _) = app.get(&format!("/api/projects/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get(&format!("/api/projects/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project"]["title"], "Draft");

    let (_, admin) = app.get("/api/projects/admin", Some(&token)).await;
    assert_eq!(admin["projects"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_includes_documents() {
    let app = TestApp::new();
    let token = app.editor_token().await;
    let project = create_project(&app, &token, "Riverside", "new").await;
    let id = project["id"].as_str().unwrap();

    let (status, _) = app
        .json(
            Method::POST,
            "/api/documents/admin",
            Some(&token),
            json!({
                "title": "Floor plan",
                "fileUrl": "https://cdn.test/plan.pdf",
                "fileType": "pdf",
                "category": "plans",
                "projectId": id
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.get(&format!("/api/projects/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let documents = body["project"]["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["title"], "Floor plan");
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let app = TestApp::new();
    let (status, _) = app.get("/api/projects/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Reorder and move
// =============================================================================

#[tokio::test]
async fn test_reorder_renumbers_sequence() {
    let app = TestApp::new();
    let token = app.editor_token().await;

    let a = create_project(&app, &token, "A", "new").await;
    let b = create_project(&app, &token, "B", "new").await;
    let c = create_project(&app, &token, "C", "new").await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/projects/reorder",
            Some(&token),
            json!({"category": "new", "items": [{"id": c["id"]}, {"id": a["id"]}, {"id": b["id"]}]}),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    let titles: Vec<(&str, i64)> = body["projects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| (p["title"].as_str().unwrap(), p["order"].as_i64().unwrap()))
        .collect();
    assert_eq!(titles, vec![("C", 1), ("A", 2), ("B", 3)]);
}

#[tokio::test]
async fn test_reorder_rejects_bad_input() {
    let app = TestApp::new();
    let token = app.editor_token().await;

    let a = create_project(&app, &token, "A", "new").await;
    let other = create_project(&app, &token, "Old", "classic").await;

    let (status, _) = app
        .json(Method::POST, "/api/projects/reorder", Some(&token), json!({"items": []}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::POST,
            "/api/projects/reorder",
            Some(&token),
            json!({"items": [{"id": a["id"]}, {"id": a["id"]}]}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::POST,
            "/api/projects/reorder",
            Some(&token),
            json!({"category": "new", "items": [{"id": a["id"]}, {"id": other["id"]}]}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::POST,
            "/api/projects/reorder",
            Some(&token),
            json!({"items": [{"id": a["id"]}, {"id": uuid::Uuid::new_v4()}]}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get(&format!("/api/projects/{}", a["id"].as_str().unwrap()), None).await;
    assert_eq!(body["project"]["order"], 1);
}

#[tokio::test]
async fn test_move_swaps_with_neighbour() {
    let app = TestApp::new();
    let token = app.editor_token().await;

    let a = create_project(&app, &token, "A", "classic").await;
    let b = create_project(&app, &token, "B", "classic").await;
    let b_id = b["id"].as_str().unwrap();

    let (status, body) = app
        .json(
            Method::POST,
            &format!("/api/projects/{}/move", b_id),
            Some(&token),
            json!({"direction": "up"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["swappedWith"], a["id"]);

    let (_, list) = app.get("/api/projects?category=classic", None).await;
    assert_eq!(list["projects"][0]["title"], "B");
    assert_eq!(list["projects"][1]["title"], "A");
}

#[tokio::test]
async fn test_move_at_boundary() {
    let app = TestApp::new();
    let token = app.editor_token().await;

    let a = create_project(&app, &token, "A", "new").await;
    let (status, body) = app
        .json(
            Method::POST,
            &format!("/api/projects/{}/move", a["id"].as_str().unwrap()),
            Some(&token),
            json!({"direction": "up"}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "boundary reached");

    let (status, _) = app
        .json(
            Method::POST,
            &format!("/api/projects/{}/move", uuid::Uuid::new_v4()),
            Some(&token),
            json!({"direction": "down"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_keeps_documents_unlinked() {
    let app = TestApp::new();
    let token = app.editor_token().await;
    let project = create_project(&app, &token, "Riverside", "new").await;
    let id = project["id"].as_str().unwrap();

    let (_, created) = app
        .json(
            Method::POST,
            "/api/documents/admin",
            Some(&token),
            json!({
                "title": "Brochure",
                "fileUrl": "/files/brochure.pdf",
                "fileType": "pdf",
                "category": "brochures",
                "projectId": id
            }),
        )
        .await;
    let document_id = created["document"]["id"].as_str().unwrap().to_string();

    let (status, body) = app.delete(&format!("/api/projects/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = app.get(&format!("/api/documents/{}", document_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["document"]["projectId"].is_null());

    let (status, _) = app.delete(&format!("/api/projects/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
