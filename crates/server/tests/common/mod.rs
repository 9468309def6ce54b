//! # Common Test Utilities
//!
//! Every test gets its own migrated and seeded in-memory SQLite database plus
//! the full application router, and talks to it over HTTP via `oneshot`.

#![allow(dead_code)]

use std::sync::Once;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use entity::users;
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::{json, Value};
use server::{create_app_router, AppState};
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "Velvet-Harbor-42";

static INIT: Once = Once::new();

/// Initialize test logging (run once per test binary)
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// An authenticated test user
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id:      String,
    pub email:   String,
    pub access:  String,
    pub refresh: String,
}

pub struct TestApp {
    pub state:  AppState,
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        init_test_env();

        let db = migration::connect_with_pool("sqlite::memory:", 1)
            .await
            .expect("Failed to open in-memory database");
        Migrator::up(&db, None).await.expect("Failed to run migrations");
        migration::seeds::run_all_seeds(&db, false)
            .await
            .expect("Failed to seed permissions");

        let jwt_config = auth::JwtConfig {
            secret:             general_purpose::STANDARD.encode("test-jwt-secret-for-integration-tests-32bytes!!"),
            expiration_seconds: 3600,
            issuer:             "crm-test".to_string(),
            audience:           "crm-api-test".to_string(),
        };

        let state = AppState::new(db, jwt_config);
        let router = create_app_router(state.clone());
        Self {
            state,
            router,
        }
    }

    /// Send a request and return the status with the decoded JSON body
    /// (`Value::Null` for an empty body).
    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => {
                builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap()
            },
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        }
        else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, json)
    }

    /// POST a raw body, for payloads that are not valid JSON.
    pub async fn post_raw(&self, uri: &str, token: &str, body: &'static str) -> StatusCode {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap().status()
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(token), Some(body)).await
    }

    /// Register a user through the public endpoint with the given role.
    pub async fn register(&self, username: &str, role: &str) -> TestUser {
        let email = format!("{username}@example.com");
        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/users/register",
                None,
                Some(json!({
                    "email": email,
                    "username": username,
                    "first_name": "Test",
                    "last_name": "User",
                    "password": TEST_PASSWORD,
                    "password_confirm": TEST_PASSWORD,
                    "role": role,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

        TestUser {
            id: body["user"]["id"].as_str().unwrap().to_string(),
            email,
            access: body["tokens"]["access"].as_str().unwrap().to_string(),
            refresh: body["tokens"]["refresh"].as_str().unwrap().to_string(),
        }
    }

    /// Admins cannot self-register, so promote a registered user directly.
    pub async fn admin(&self, username: &str) -> TestUser {
        let user = self.register(username, "sales").await;
        let model = users::Entity::find_by_id(user.id.as_str())
            .one(&self.state.db)
            .await
            .unwrap()
            .unwrap();
        let mut active: users::ActiveModel = model.into();
        active.role = Set(users::UserRole::Admin);
        active.update(&self.state.db).await.unwrap();
        user
    }

    pub async fn set_manager(&self, user_id: &str, manager_id: &str) {
        let model = users::Entity::find_by_id(user_id)
            .one(&self.state.db)
            .await
            .unwrap()
            .unwrap();
        let mut active: users::ActiveModel = model.into();
        active.manager_id = Set(Some(manager_id.to_string()));
        active.update(&self.state.db).await.unwrap();
    }

    /// Create a customer through the API and return its id.
    pub async fn customer(&self, token: &str, email: &str) -> String {
        let (status, body) = self
            .post(
                "/api/customers",
                token,
                json!({ "first_name": "Ada", "last_name": "Lovelace", "email": email }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "customer create failed: {body}");
        body["id"].as_str().unwrap().to_string()
    }
}
