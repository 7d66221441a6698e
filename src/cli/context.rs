//! Per-invocation wiring: durable store, API client and project scope.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::adapters::sqlite::{initialize_database, PoolConfig};
use crate::adapters::{MemoryKeyValueStore, SqliteKeyValueStore, WorkflowApiClient};
use crate::domain::models::{Config, StorageConfig};
use crate::domain::ports::{KeyValueStore, WorkflowApi};
use crate::services::{CockpitSession, CockpitStorage, PollerConfig, ProjectScope};

pub struct CliContext {
    pub config: Config,
    pub json: bool,
    pub store: Arc<dyn KeyValueStore>,
    pub scope: ProjectScope,
    explicit_project: Option<String>,
}

impl CliContext {
    pub async fn new(config: Config, explicit_project: Option<String>, json: bool) -> Self {
        let store = open_store(&config.storage).await;
        let scope = ProjectScope::new(Arc::clone(&store));

        Self {
            config,
            json,
            store,
            scope,
            explicit_project,
        }
    }

    /// The active project: `--project` if given (and remembered), otherwise
    /// the last remembered one.
    pub async fn project(&self) -> Option<String> {
        self.scope.resolve(self.explicit_project.as_deref()).await
    }

    pub async fn require_project(&self) -> Result<String> {
        self.project().await.context(
            "No active project. Pass --project <id> or run `weaver project use <id>` first.",
        )
    }

    pub fn api(&self) -> Result<Arc<dyn WorkflowApi>> {
        let client = WorkflowApiClient::new(&self.config.api)
            .context("Failed to build workflow API client")?;
        Ok(Arc::new(client))
    }

    pub async fn storage(&self, project_id: &str) -> CockpitStorage {
        CockpitStorage::open(Arc::clone(&self.store), Some(project_id)).await
    }

    pub async fn session(&self, project_id: &str) -> Result<CockpitSession> {
        Ok(CockpitSession::open(
            self.api()?,
            Arc::clone(&self.store),
            Some(project_id),
            PollerConfig::from(&self.config.polling),
        )
        .await)
    }
}

/// Open the durable store, falling back to a session-only store when the
/// database is unavailable.
pub async fn open_store(config: &StorageConfig) -> Arc<dyn KeyValueStore> {
    let pool_config = PoolConfig {
        max_connections: config.max_connections,
        acquire_timeout: Duration::from_secs(3),
    };

    match initialize_database(Path::new(&config.database_path), pool_config).await {
        Ok(pool) => {
            debug!(path = %config.database_path, "local store opened");
            Arc::new(SqliteKeyValueStore::new(pool))
        }
        Err(err) => {
            warn!(
                path = %config.database_path,
                error = %err,
                "local store unavailable, state will not survive this session"
            );
            Arc::new(MemoryKeyValueStore::new())
        }
    }
}
