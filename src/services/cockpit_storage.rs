//! Per-project cache of saved outputs and phase outputs.
//!
//! Both maps live in one durable entry per project (`cockpit:<project>`).
//! Mutators are write-through: the next value is computed, persisted, then
//! installed in memory before the call returns. A failed write is logged and
//! the in-memory update still happens, so the cockpit degrades to
//! session-only state instead of failing the caller.
//!
//! Other processes may write the same entry while this one is open, so each
//! mutator re-reads the entry first and only replaces the map it changes.
//! After a failed write the in-memory copy is the newer one and is used as is
//! until a write succeeds again.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::models::{CockpitSnapshot, PhaseOutputs, SavedOutputs, Update};
use crate::domain::ports::KeyValueStore;

const KEY_PREFIX: &str = "cockpit";

pub struct CockpitStorage {
    store: Arc<dyn KeyValueStore>,
    project_id: Option<String>,
    snapshot: CockpitSnapshot,
    in_sync: bool,
}

impl CockpitStorage {
    /// Create storage bound to `project_id`, loading its persisted content.
    pub async fn open(store: Arc<dyn KeyValueStore>, project_id: Option<&str>) -> Self {
        let mut storage = Self {
            store,
            project_id: None,
            snapshot: CockpitSnapshot::default(),
            in_sync: true,
        };
        storage.switch_project(project_id).await;
        storage
    }

    pub fn storage_key(project_id: &str) -> String {
        format!("{KEY_PREFIX}:{project_id}")
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub const fn saved_outputs(&self) -> &SavedOutputs {
        &self.snapshot.saved_outputs
    }

    pub const fn phase_outputs(&self) -> &PhaseOutputs {
        &self.snapshot.phase_outputs
    }

    /// Rebind to another project (or none), replacing both maps with that
    /// project's persisted content.
    pub async fn switch_project(&mut self, project_id: Option<&str>) {
        self.project_id = project_id.map(str::to_string);
        self.snapshot = match project_id {
            Some(id) => self.load(id).await,
            None => CockpitSnapshot::default(),
        };
        self.in_sync = true;
        debug!(
            project_id = ?self.project_id,
            phase_outputs = self.snapshot.phase_outputs.len(),
            saved_outputs = self.snapshot.saved_outputs.len(),
            "cockpit storage loaded"
        );
    }

    pub async fn set_saved_outputs_and_persist(&mut self, update: impl Into<Update<SavedOutputs>>) {
        let current = self.latest().await;
        let candidate = CockpitSnapshot {
            saved_outputs: update.into().resolve(&current.saved_outputs),
            phase_outputs: current.phase_outputs,
        };
        self.in_sync = self.persist(&candidate).await;
        self.snapshot = candidate;
    }

    pub async fn set_phase_outputs_and_persist(&mut self, update: impl Into<Update<PhaseOutputs>>) {
        let current = self.latest().await;
        let candidate = CockpitSnapshot {
            saved_outputs: current.saved_outputs,
            phase_outputs: update.into().resolve(&current.phase_outputs),
        };
        self.in_sync = self.persist(&candidate).await;
        self.snapshot = candidate;
    }

    /// The freshest known content: the stored entry while it is readable and
    /// this instance's last write went through, else the in-memory copy.
    async fn latest(&self) -> CockpitSnapshot {
        let Some(project_id) = self.project_id.as_deref().filter(|_| self.in_sync) else {
            return self.snapshot.clone();
        };

        match self.store.get(&Self::storage_key(project_id)).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                debug!(project_id, error = %err, "stored cockpit state unreadable, keeping memory copy");
                self.snapshot.clone()
            }),
            Ok(None) => self.snapshot.clone(),
            Err(err) => {
                debug!(project_id, error = %err, "cockpit state re-read failed, keeping memory copy");
                self.snapshot.clone()
            }
        }
    }

    async fn load(&self, project_id: &str) -> CockpitSnapshot {
        let key = Self::storage_key(project_id);
        match self.store.get(&key).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(project_id, error = %err, "stored cockpit state is malformed, starting empty");
                CockpitSnapshot::default()
            }),
            Ok(None) => CockpitSnapshot::default(),
            Err(err) => {
                warn!(project_id, error = %err, "failed to read cockpit state, starting empty");
                CockpitSnapshot::default()
            }
        }
    }

    /// Write `snapshot` under the active project. Returns whether the stored
    /// entry now matches it; without a project there is nothing to match.
    async fn persist(&self, snapshot: &CockpitSnapshot) -> bool {
        let Some(project_id) = self.project_id.as_deref() else {
            return true;
        };

        let raw = match serde_json::to_string(snapshot) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(project_id, error = %err, "failed to encode cockpit state");
                return false;
            }
        };

        match self.store.set(&Self::storage_key(project_id), &raw).await {
            Ok(()) => true,
            Err(err) => {
                warn!(project_id, error = %err, "failed to persist cockpit state");
                false
            }
        }
    }
}
