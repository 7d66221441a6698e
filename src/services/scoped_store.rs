//! Scope-namespaced persistence of boolean maps.

use std::sync::Arc;
use tracing::warn;

use crate::domain::models::PanelStates;
use crate::domain::ports::KeyValueStore;

const NAMESPACE: &str = "panelState";

/// Loads and saves `panel id -> bool` maps under a per-scope key.
///
/// Neither operation fails: unreadable or malformed entries load as an empty
/// map, and failed writes are logged and dropped.
#[derive(Clone)]
pub struct ScopedLocalStore {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
}

impl ScopedLocalStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            namespace: NAMESPACE.to_string(),
        }
    }

    /// Storage key for a scope; `None` selects the shared namespace.
    pub fn key_for(&self, scope: Option<&str>) -> String {
        match scope {
            Some(scope) => format!("{}:{scope}", self.namespace),
            None => self.namespace.clone(),
        }
    }

    pub async fn load(&self, scope: Option<&str>) -> PanelStates {
        let key = self.key_for(scope);
        let raw = match self.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return PanelStates::new(),
            Err(err) => {
                warn!(key = %key, error = %err, "failed to read scoped state");
                return PanelStates::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(key = %key, error = %err, "discarding malformed scoped state");
            PanelStates::new()
        })
    }

    pub async fn save(&self, scope: Option<&str>, states: &PanelStates) {
        let key = self.key_for(scope);
        let raw = match serde_json::to_string(states) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key = %key, error = %err, "failed to encode scoped state");
                return;
            }
        };

        if let Err(err) = self.store.set(&key, &raw).await {
            warn!(key = %key, error = %err, "failed to persist scoped state");
        }
    }
}
