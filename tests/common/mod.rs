//! Common test utilities for integration tests
//!
//! Shared fixtures for the wiremock-backed engine, durable stores and fast
//! poller timings.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::MockServer;

use weaver_cockpit::adapters::sqlite::{initialize_database, PoolConfig};
use weaver_cockpit::domain::models::ApiConfig;
use weaver_cockpit::{KeyValueStore, PollerConfig, SqliteKeyValueStore, WorkflowApi, WorkflowApiClient};

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Path to a `SQLite` database file inside a fresh temporary directory
pub fn temp_db_path() -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let db_path = dir.path().join("cockpit.db");
    (dir, db_path)
}

/// Open (or reopen) the durable store at `path`
pub async fn sqlite_store(path: &std::path::Path) -> Arc<dyn KeyValueStore> {
    let pool = initialize_database(path, PoolConfig::default())
        .await
        .expect("Failed to open test database");
    Arc::new(SqliteKeyValueStore::new(pool))
}

/// Setup test logging
#[allow(dead_code)]
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// API client pointed at a mock engine
pub fn api_client(server: &MockServer) -> Arc<dyn WorkflowApi> {
    let config = ApiConfig {
        base_url: format!("{}/api", server.uri()),
        timeout_secs: 5,
    };
    Arc::new(WorkflowApiClient::new(&config).expect("Failed to build API client"))
}

/// Poller timings short enough for real-time tests
pub fn fast_poller() -> PollerConfig {
    PollerConfig {
        interval: Duration::from_millis(20),
        refresh_delays: vec![Duration::from_millis(10), Duration::from_millis(30)],
    }
}

/// A workflow status body as the engine sends it
pub fn status_body(run_id: &str, status: &str, outputs: Value) -> Value {
    json!({
        "workflowId": run_id,
        "phase": null,
        "status": status,
        "progress": if status == "completed" { 100.0 } else { 40.0 },
        "currentStep": if status == "completed" { Value::Null } else { json!("drafting") },
        "outputs": outputs,
        "error": null,
    })
}

/// A project progress body
pub fn progress_body(project_id: &str, overall: f64) -> Value {
    json!({
        "projectId": project_id,
        "overallProgress": overall,
        "phases": [
            {"phase": 1, "status": "completed", "progress": 100.0, "startedAt": null, "completedAt": null},
            {"phase": 2, "status": "in-progress", "progress": 40.0}
        ],
        "chaptersCompleted": 0,
        "totalChapters": 12,
    })
}

/// Number of requests the mock engine has received for `path`
pub async fn request_count(server: &MockServer, path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == path)
        .count()
}
