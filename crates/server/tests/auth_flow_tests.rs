//! # Authentication Flow Tests
//!
//! Registration, login, token issue and rotation, logout and password changes
//! exercised through the HTTP router.

mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, TEST_PASSWORD};
use entity::users;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;

#[tokio::test]
async fn test_register_returns_user_and_tokens() {
    let app = TestApp::new().await;
    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/users/register",
            None,
            Some(json!({
                "email": "Grace@Example.com",
                "username": "grace",
                "first_name": "Grace",
                "last_name": "Hopper",
                "password": TEST_PASSWORD,
                "password_confirm": TEST_PASSWORD,
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "grace@example.com");
    assert_eq!(body["user"]["role"], "sales");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["tokens"]["access"].is_string());
    assert!(body["tokens"]["refresh"].is_string());
}

#[tokio::test]
async fn test_register_password_mismatch_creates_nothing() {
    let app = TestApp::new().await;
    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/users/register",
            None,
            Some(json!({
                "email": "mismatch@example.com",
                "username": "mismatch",
                "password": TEST_PASSWORD,
                "password_confirm": "Something-Else-17",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["non_field_errors"][0], "Passwords don't match.");
    assert!(body["details"].get("password").is_none());
    assert_eq!(users::Entity::find().count(&app.state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_register_as_admin_is_rejected() {
    let app = TestApp::new().await;
    let (status, _) = app
        .request(
            Method::POST,
            "/api/auth/users/register",
            None,
            Some(json!({
                "email": "sneaky@example.com",
                "username": "sneaky",
                "password": TEST_PASSWORD,
                "password_confirm": TEST_PASSWORD,
                "role": "admin",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(users::Entity::find().count(&app.state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_login_messages() {
    let app = TestApp::new().await;
    let user = app.register("linus", "sales").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/users/login",
            None,
            Some(json!({ "email": user.email })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["non_field_errors"][0], "Must include email and password.");

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/users/login",
            None,
            Some(json!({ "email": user.email, "password": "Wrong-Password-99" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["non_field_errors"][0], "Invalid email or password.");

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/users/login",
            None,
            Some(json!({ "email": user.email, "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user.id.as_str());
    assert!(body["user"]["last_login"].is_string());
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = TestApp::new().await;
    let (status, _) = app.request(Method::GET, "/api/auth/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/auth/users/me", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_obtain_and_refresh_rotation() {
    let app = TestApp::new().await;
    let user = app.register("margaret", "sales").await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/token",
            None,
            Some(json!({ "email": user.email, "password": "Wrong-Password-99" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, pair) = app
        .request(
            Method::POST,
            "/api/token",
            None,
            Some(json!({ "email": user.email, "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let refresh = pair["refresh"].as_str().unwrap().to_string();

    let (status, rotated) = app
        .request(
            Method::POST,
            "/api/token/refresh",
            None,
            Some(json!({ "refresh": refresh })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(rotated["refresh"], pair["refresh"]);

    // The rotated-out token is spent.
    let (status, _) = app
        .request(
            Method::POST,
            "/api/token/refresh",
            None,
            Some(json!({ "refresh": refresh })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, me) = app
        .get("/api/auth/users/me", rotated["access"].as_str().unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "margaret");
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let app = TestApp::new().await;
    let user = app.register("barbara", "support").await;

    let (status, _) = app
        .post("/api/auth/logout", &user.access, json!({ "refresh": user.refresh }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/token/refresh",
            None,
            Some(json!({ "refresh": user.refresh })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::new().await;
    let user = app.register("edsger", "sales").await;

    let (status, body) = app
        .post(
            "/api/auth/users/change_password",
            &user.access,
            json!({
                "old_password": "Not-The-Password-1",
                "new_password": "Quiet-Meadow-Lamp-8",
                "new_password_confirm": "Quiet-Meadow-Lamp-8",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["old_password"][0], "Old password is incorrect.");

    let (status, body) = app
        .post(
            "/api/auth/users/change_password",
            &user.access,
            json!({
                "old_password": TEST_PASSWORD,
                "new_password": "Quiet-Meadow-Lamp-8",
                "new_password_confirm": "Quiet-Meadow-Lamp-8",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password changed successfully");

    let (status, _) = app
        .request(
            Method::POST,
            "/api/auth/users/login",
            None,
            Some(json!({ "email": user.email, "password": "Quiet-Meadow-Lamp-8" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}
