//! Active project resolution with a remembered fallback.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::ports::KeyValueStore;

/// Key under which the last selected project id is remembered.
pub const LAST_PROJECT_KEY: &str = "lastProjectId";

#[derive(Clone)]
pub struct ProjectScope {
    store: Arc<dyn KeyValueStore>,
}

impl ProjectScope {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Pick the active project.
    ///
    /// An explicit selection wins and is remembered; otherwise the last
    /// remembered project is re-applied.
    pub async fn resolve(&self, explicit: Option<&str>) -> Option<String> {
        match explicit.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => {
                self.remember(id).await;
                Some(id.to_string())
            }
            None => self.last_used().await,
        }
    }

    pub async fn remember(&self, project_id: &str) {
        if let Err(err) = self.store.set(LAST_PROJECT_KEY, project_id).await {
            warn!(project_id, error = %err, "failed to remember project");
        } else {
            debug!(project_id, "remembered project");
        }
    }

    pub async fn last_used(&self) -> Option<String> {
        match self.store.get(LAST_PROJECT_KEY).await {
            Ok(value) => value.filter(|id| !id.is_empty()),
            Err(err) => {
                warn!(error = %err, "failed to read remembered project");
                None
            }
        }
    }

    pub async fn forget(&self) {
        if let Err(err) = self.store.remove(LAST_PROJECT_KEY).await {
            warn!(error = %err, "failed to forget project");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryKeyValueStore;

    #[tokio::test]
    async fn test_explicit_selection_is_remembered() {
        let memory = MemoryKeyValueStore::new();
        let scope = ProjectScope::new(Arc::new(memory.clone()));

        assert_eq!(scope.resolve(Some("noir-novel")).await.as_deref(), Some("noir-novel"));
        assert_eq!(scope.resolve(None).await.as_deref(), Some("noir-novel"));
        assert_eq!(memory.peek(LAST_PROJECT_KEY).as_deref(), Some("noir-novel"));
    }

    #[tokio::test]
    async fn test_blank_selection_falls_back() {
        let memory = MemoryKeyValueStore::new();
        let scope = ProjectScope::new(Arc::new(memory));

        assert!(scope.resolve(Some("  ")).await.is_none());
        scope.remember("p1").await;
        assert_eq!(scope.resolve(Some("")).await.as_deref(), Some("p1"));

        scope.forget().await;
        assert!(scope.resolve(None).await.is_none());
    }

    #[tokio::test]
    async fn test_store_failure_degrades_to_none() {
        let memory = MemoryKeyValueStore::new();
        memory.fail_reads(true);
        memory.fail_writes(true);
        let scope = ProjectScope::new(Arc::new(memory));

        assert_eq!(scope.resolve(Some("p1")).await.as_deref(), Some("p1"));
        assert!(scope.resolve(None).await.is_none());
    }
}
