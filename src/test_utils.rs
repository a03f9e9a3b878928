//! Shared test fixtures: an application instance over the in-memory backend
//! plus helpers for the common register/login/create-store dance.

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use axum_test::multipart::MultipartForm;
use serde_json::json;

use crate::api::models::auth::LoginResponse;
use crate::api::models::stores::StoreResponse;
use crate::api::models::users::UserResponse;
use crate::authz::Role;
use crate::config::Config;
use crate::db::MemoryBackend;
use crate::types::{StoreId, UserId};
use crate::{AppState, build_router};

pub const TEST_PASSWORD: &str = "Passw0rd!";

pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.secret_key = Some("test-secret-key".to_string());
    // Per-test uploads directory, so logo tests cannot see each other
    config.uploads.directory = std::env::temp_dir().join(format!("boulevard-test-{}", uuid::Uuid::new_v4()));
    config
}

pub fn create_test_state() -> AppState {
    AppState::builder()
        .db(Arc::new(MemoryBackend::new()))
        .config(create_test_config())
        .build()
}

pub fn create_test_server_with_state() -> (TestServer, AppState) {
    let state = create_test_state();
    let router = build_router(&state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");
    (server, state)
}

pub fn create_test_server() -> TestServer {
    create_test_server_with_state().0
}

pub async fn register_user(server: &TestServer, username: &str, email: &str) -> UserResponse {
    let response = server
        .post("/auth/register")
        .json(&json!({ "username": username, "email": email, "password": TEST_PASSWORD }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK, "register {username}: {}", response.text());
    response.json()
}

pub async fn register_and_login(server: &TestServer, username: &str, email: &str) -> (String, UserResponse) {
    register_user(server, username, email).await;

    let response = server
        .post("/auth/login")
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK, "login {email}: {}", response.text());
    let login: LoginResponse = response.json();
    (login.access, login.user)
}

pub async fn create_test_store(server: &TestServer, token: &str, name: &str) -> StoreResponse {
    let response = server
        .post("/stores")
        .authorization_bearer(token)
        .multipart(MultipartForm::new().add_text("name", name))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED, "create store {name}: {}", response.text());
    response.json()
}

pub async fn add_worker(server: &TestServer, token: &str, store_id: StoreId, user_id: UserId, role: Role) {
    let response = server
        .post(&format!("/stores/{store_id}/workers"))
        .authorization_bearer(token)
        .json(&json!({ "user_id": user_id, "role": role }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK, "add worker: {}", response.text());
}
