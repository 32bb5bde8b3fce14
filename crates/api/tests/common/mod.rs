//! Common test utilities for integration tests.
//!
//! Every test runs the full router over the in-memory repositories, with a
//! recording mailer and blob store in place of the outbound integrations.

// Helpers are shared by several test binaries; not every binary uses all of them.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{header, Method, Request, StatusCode},
    Router,
};
use banglong_api::{
    app::{create_app, AppState},
    config::{
        AdminConfig, CaptchaConfig, Config, DatabaseConfig, EmailConfig, JwtAuthConfig,
        LoggingConfig, SecurityConfig, ServerConfig, StorageConfig, StoreBackend,
    },
    services::{
        blob_storage::{BlobError, BlobStore, StoredBlob},
        email::{EmailError, EmailMessage, Mailer},
    },
};
use domain::models::user::{NewUser, User, UserRole};
use persistence::Repositories;
use serde_json::Value;
use shared::jwt::SessionSubject;
use shared::password::hash_password;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "Secret123";

/// Records every message instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
    fail: Mutex<bool>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Makes every following send fail as if the relay were down.
    pub fn fail_all(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        if *self.fail.lock().unwrap() {
            return Err(EmailError::Rejected {
                status: 502,
                body: "relay down".into(),
            });
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Keeps uploaded objects in memory.
#[derive(Default)]
pub struct FakeBlobStore {
    objects: Mutex<Vec<(String, String, Bytes)>>,
}

impl FakeBlobStore {
    /// `(pathname, content_type, bytes)` in upload order.
    pub fn objects(&self) -> Vec<(String, String, Bytes)> {
        self.objects.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn put(
        &self,
        pathname: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<StoredBlob, BlobError> {
        let size = bytes.len();
        self.objects
            .lock()
            .unwrap()
            .push((pathname.to_string(), content_type.to_string(), bytes));

        Ok(StoredBlob {
            url: format!("https://blobs.test/{}", pathname),
            pathname: pathname.to_string(),
            content_type: content_type.to_string(),
            size,
        })
    }
}

/// Test configuration over the in-memory store.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
            max_body_size: 1024 * 1024,
        },
        database: DatabaseConfig {
            url: String::new(),
            store: StoreBackend::Memory,
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 10,
            idle_timeout_secs: 600,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
            rate_limit_per_minute: 0, // Disable rate limiting for tests
            hsts_enabled: false,
        },
        jwt: JwtAuthConfig {
            secret: "integration-test-secret-at-least-32-bytes".to_string(),
            session_expiry_secs: 3600,
            leeway_secs: 30,
        },
        email: EmailConfig {
            enabled: true,
            default_receiver: "office@banglong.test".to_string(),
            site_base_url: "https://site.test".to_string(),
            sender_name: "Banglong".to_string(),
            ..EmailConfig::default()
        },
        storage: StorageConfig {
            max_upload_bytes: 1024,
            ..StorageConfig::default()
        },
        captcha: CaptchaConfig {
            expose_code: true,
            store: StoreBackend::Memory,
            ..CaptchaConfig::default()
        },
        admin: AdminConfig::default(),
    }
}

/// A router plus handles on its fakes.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    pub blobs: Arc<FakeBlobStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let mailer = Arc::new(RecordingMailer::default());
        let blobs = Arc::new(FakeBlobStore::default());
        let state = AppState::new(
            config,
            Repositories::in_memory(),
            mailer.clone(),
            blobs.clone(),
        )
        .expect("valid test state");

        Self {
            router: create_app(state.clone()),
            state,
            mailer,
            blobs,
        }
    }

    /// Inserts a user with [`TEST_PASSWORD`] and returns it with a session token.
    pub async fn create_user(&self, email: &str, role: UserRole) -> (User, String) {
        let user = self
            .state
            .repos
            .users
            .create(NewUser {
                name: "Test User".to_string(),
                email: email.to_string(),
                password_hash: hash_password(TEST_PASSWORD).unwrap(),
                role,
                reset_token_hash: None,
                reset_token_expires_at: None,
                has_changed_password: true,
            })
            .await
            .unwrap();

        let (token, _) = self
            .state
            .jwt
            .issue_session(&SessionSubject {
                user_id: user.id,
                email: &user.email,
                name: &user.name,
                role: user.role.as_str(),
            })
            .unwrap();

        (user, token)
    }

    pub async fn admin_token(&self) -> String {
        self.create_user("admin@banglong.test", UserRole::Admin).await.1
    }

    pub async fn editor_token(&self) -> String {
        self.create_user("editor@banglong.test", UserRole::Editor).await.1
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, parse_response_body(response).await)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, token, None)).await
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.send(request(method, uri, token, Some(body))).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::DELETE, uri, token, None)).await
    }

    /// Fetches a challenge and returns `(captchaId, code)`.
    pub async fn captcha(&self) -> (String, String) {
        let (status, body) = self.get("/api/captcha", None).await;
        assert_eq!(status, StatusCode::OK);
        (
            body["captchaId"].as_str().unwrap().to_string(),
            body["code"].as_str().unwrap().to_string(),
        )
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Parse the JSON body; empty or non-JSON bodies become `Value::Null`.
pub async fn parse_response_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

/// Creates a project through the API and returns its JSON.
pub async fn create_project(app: &TestApp, token: &str, title: &str, category: &str) -> Value {
    let (status, body) = app
        .json(
            Method::POST,
            "/api/projects/admin",
            Some(token),
            serde_json::json!({
                "title": title,
                "category": category,
                "imageUrl": "https://cdn.test/p.jpg"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create project failed: {}", body);
    body["project"].clone()
}
