//! Test utilities and fixtures for license server integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use serde_json::Value;

pub use license_server::db::{AppState, create_memory_pool, init_db, queries};
pub use license_server::handlers;
pub use license_server::models::*;
pub use license_server::service::LicenseService;
pub use license_server::store::{LicenseStore, MemoryStore, SqliteStore, StoreError};

pub const ADMIN_KEY: &str = "test-admin-key";

pub const ONE_DAY: i64 = 86400;

/// Get the current timestamp
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Get a future timestamp (days from now)
pub fn future_timestamp(days: i64) -> i64 {
    now() + (days * ONE_DAY)
}

/// Get a past timestamp (days ago)
pub fn past_timestamp(days: i64) -> i64 {
    now() - (days * ONE_DAY)
}

/// SQLite store over a private in-memory database with schema initialized
pub fn sqlite_memory_store() -> SqliteStore {
    let pool = create_memory_pool().expect("Failed to create in-memory pool");
    {
        let conn = pool.get().unwrap();
        init_db(&conn).expect("Failed to initialize schema");
    }
    SqliteStore::new(pool)
}

/// SQLite store backed by a file in a fresh temp directory.
///
/// The directory guard must be kept alive for the duration of the test.
pub fn sqlite_file_store(pool_size: u32) -> (SqliteStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("licenses.db");
    let store = SqliteStore::open(path.to_str().unwrap(), pool_size)
        .expect("Failed to open file-backed store");
    (store, dir)
}

pub fn test_service(store: Arc<dyn LicenseStore>) -> LicenseService {
    LicenseService::new(store, ADMIN_KEY)
}

/// Create an AppState for testing with an in-memory SQLite database
pub fn create_test_app_state() -> AppState {
    AppState::new(Arc::new(sqlite_memory_store()), ADMIN_KEY)
}

/// Router with every endpoint and no transport layers
pub fn test_app(state: AppState) -> Router {
    handlers::router().with_state(state)
}

/// Issue a license straight through the service
pub fn create_test_license(service: &LicenseService, expires_at: Option<i64>) -> License {
    let admin = service
        .authorize(Some(ADMIN_KEY))
        .expect("test admin key should authorize");
    service
        .generate(&admin, expires_at)
        .expect("Failed to create test license")
}

pub fn json_post(uri: &str, body: &Value, admin_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = admin_key {
        builder = builder.header("X-Admin-Key", key);
    }
    builder
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

pub fn admin_get(uri: &str, admin_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(key) = admin_key {
        builder = builder.header("X-Admin-Key", key);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).expect("Response should be valid JSON")
}
