//! Test helpers for Web API tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use mockable::DefaultClock;
use serde_json::{json, Value};

use nimbus::web::build_app;
use nimbus::{Config, Database};

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only";

/// Create a test configuration.
///
/// Hashing costs are minimal and the weather window is a full day so
/// only tests that exhaust it on purpose ever see a 429.
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.jwt.secret_key = TEST_SECRET.to_string();
    config.hashing.memory_kib = 8;
    config.hashing.iterations = 1;
    config.hashing.parallelism = 1;
    config.rate_limit.window_secs = 86_400;
    config.rate_limit.login_rate_limit = 1000;
    config.weather.data_path = "data/weather-data.json".to_string();
    config.locale.path = "locales".to_string();
    config
}

/// Create a test server with an in-memory database.
pub async fn create_test_server() -> TestServer {
    create_test_server_with(create_test_config()).await
}

/// Create a test server from a custom configuration.
pub async fn create_test_server_with(config: Config) -> TestServer {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let router = build_app(&config, &db, Arc::new(DefaultClock)).expect("Failed to build app");
    TestServer::new(router).expect("Failed to create test server")
}

/// Register a user and return the response body.
pub async fn register_user(server: &TestServer, username: &str, password: &str) -> Value {
    server
        .post("/api/auth/register")
        .json(&json!({
            "username": username,
            "password": password
        }))
        .await
        .json::<Value>()
}

/// Log in and return the response body.
pub async fn login_user(server: &TestServer, username: &str, password: &str) -> Value {
    server
        .post("/api/auth/login")
        .json(&json!({
            "username": username,
            "password": password
        }))
        .await
        .json::<Value>()
}

/// Register a user and return the issued token.
pub async fn token_for(server: &TestServer, username: &str, password: &str) -> String {
    let body = register_user(server, username, password).await;
    body["data"]["token"]
        .as_str()
        .expect("registration should return a token")
        .to_string()
}

/// Format a bearer authorization header value.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
