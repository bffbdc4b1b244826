//! Shared helpers for the test suite.

use std::sync::Arc;

use axum_test::TestServer;

use crate::config::{Config, PasswordConfig};
use crate::store::InMemoryUsers;
use crate::{AppState, build_router};

/// Config used across the handler tests: fixed secret, cheap Argon2.
pub fn create_test_config() -> Config {
    let mut config = Config {
        secret_key: Some("test-secret-key-for-jwt".to_string()),
        ..Default::default()
    };
    config.auth.password = PasswordConfig {
        argon2_memory_kib: 64,
        argon2_iterations: 1,
        argon2_parallelism: 1,
        ..PasswordConfig::default()
    };
    config
}

pub fn state_with_config(config: Config) -> AppState {
    AppState::from_parts(config, Arc::new(InMemoryUsers::new())).expect("test config must be valid")
}

pub fn create_test_state() -> AppState {
    state_with_config(create_test_config())
}

pub fn server_for_state(state: AppState) -> TestServer {
    let router = build_router(state).expect("failed to build test router");
    TestServer::new(router).expect("failed to create test server")
}

pub fn create_test_server() -> TestServer {
    server_for_state(create_test_state())
}
