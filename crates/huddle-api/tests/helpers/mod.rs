//! Test helpers: build AppState and router for integration tests.
//!
//! The router is the production one; only the stores are swapped for the
//! in-memory `MockStore`, so no database is needed.
//! Run from workspace root: `cargo test -p huddle-api`.

#![allow(dead_code)]

pub mod auth;

use axum_test::TestServer;
use huddle_api::auth::TokenVerifier;
use huddle_api::setup::routes;
use huddle_api::AppState;
use huddle_core::Config;
use huddle_db::test_helpers::MockStore;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Test application: server plus a handle on the backing store.
pub struct TestApp {
    pub server: TestServer,
    pub store: MockStore,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Bearer header value for `user_id`.
    pub fn bearer(&self, user_id: Uuid) -> String {
        format!("Bearer {}", auth::mint_token(user_id))
    }
}

pub fn test_config(require_session_membership: bool) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("DATABASE_URL", "postgres://localhost/huddle_test".to_string()),
        ("JWT_SECRET", auth::TEST_JWT_SECRET.to_string()),
        ("ENVIRONMENT", "test".to_string()),
        (
            "REQUIRE_SESSION_MEMBERSHIP",
            require_session_membership.to_string(),
        ),
    ]);
    Config::from_lookup(|key| vars.get(key).cloned()).expect("test config")
}

/// Setup test app over a fresh mock store.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(true).await
}

pub async fn setup_test_app_with(require_session_membership: bool) -> TestApp {
    let config = test_config(require_session_membership);
    let store = MockStore::new();

    let state = Arc::new(AppState::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        TokenVerifier::new(config.jwt_secret(), config.jwt_audience()),
        config.require_session_membership(),
    ));

    let router = routes::setup_routes(&config, state)
        .await
        .expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp { server, store }
}
