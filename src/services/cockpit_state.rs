//! Shared cockpit state written by pollers and read by the command surface.

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::models::{
    merge_field, normalize_outputs, Phase, PhaseActivity, PhaseOutputs, PhaseRun, ProjectProgress,
    Update,
};

use super::cockpit_storage::CockpitStorage;

pub type SharedCockpitState = Arc<Mutex<CockpitState>>;

/// The completion dialog: which phase finished and what it produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompletionDialog {
    pub open: bool,
    pub phase: Option<Phase>,
    pub output: Option<Value>,
}

pub struct CockpitState {
    runs: HashMap<Phase, String>,
    running: BTreeSet<Phase>,
    activity: HashMap<Phase, PhaseActivity>,
    dialog: CompletionDialog,
    progress: Option<ProjectProgress>,
    storage: CockpitStorage,
}

impl CockpitState {
    pub fn new(storage: CockpitStorage) -> Self {
        Self {
            runs: HashMap::new(),
            running: BTreeSet::new(),
            activity: HashMap::new(),
            dialog: CompletionDialog::default(),
            progress: None,
            storage,
        }
    }

    pub fn shared(storage: CockpitStorage) -> SharedCockpitState {
        Arc::new(Mutex::new(Self::new(storage)))
    }

    pub fn project_id(&self) -> Option<&str> {
        self.storage.project_id()
    }

    pub fn active_run(&self, phase: Phase) -> Option<&str> {
        self.runs.get(&phase).map(String::as_str)
    }

    /// True while `run` is still the run this state is waiting on.
    pub fn is_current(&self, run: &PhaseRun) -> bool {
        self.project_id() == Some(run.project_id.as_str())
            && self.active_run(run.phase) == Some(run.workflow_run_id.as_str())
    }

    pub const fn running_phases(&self) -> &BTreeSet<Phase> {
        &self.running
    }

    pub fn activity(&self, phase: Phase) -> Option<&PhaseActivity> {
        self.activity.get(&phase)
    }

    pub const fn dialog(&self) -> &CompletionDialog {
        &self.dialog
    }

    pub const fn progress(&self) -> Option<&ProjectProgress> {
        self.progress.as_ref()
    }

    pub const fn storage(&self) -> &CockpitStorage {
        &self.storage
    }

    /// Mark a run as in flight for its phase.
    pub fn begin_run(&mut self, phase: Phase, workflow_run_id: &str) {
        self.runs.insert(phase, workflow_run_id.to_string());
        self.running.insert(phase);
        self.activity.remove(&phase);
    }

    /// Forget the active run of `phase`, returning its id.
    pub fn clear_run(&mut self, phase: Phase) -> Option<String> {
        self.running.remove(&phase);
        self.activity.remove(&phase);
        self.runs.remove(&phase)
    }

    pub fn record_activity(&mut self, phase: Phase, activity: PhaseActivity) {
        self.activity.insert(phase, activity);
    }

    /// Apply the completion transition for `run`.
    ///
    /// In order: clear the run id, normalize the payload, publish it to the
    /// completion dialog, persist it as the phase output, drop the phase from
    /// the running set. Returns `None` without touching anything when `run`
    /// is no longer current.
    pub async fn complete_run(&mut self, run: &PhaseRun, raw_outputs: Value) -> Option<Value> {
        if !self.is_current(run) {
            debug!(phase = %run.phase, run_id = %run.workflow_run_id, "ignoring completion of stale run");
            return None;
        }

        self.runs.remove(&run.phase);

        let output = normalize_outputs(raw_outputs);

        self.dialog = CompletionDialog {
            open: true,
            phase: Some(run.phase),
            output: Some(output.clone()),
        };

        let phase = run.phase;
        let stored = output.clone();
        self.storage
            .set_phase_outputs_and_persist(Update::apply(move |prev: &PhaseOutputs| {
                let mut next = prev.clone();
                next.insert(phase, stored);
                next
            }))
            .await;

        self.running.remove(&run.phase);
        self.activity.remove(&run.phase);

        info!(project_id = %run.project_id, phase = %run.phase, run_id = %run.workflow_run_id, "phase completed");
        Some(output)
    }

    /// Merge `field: content` into an already published phase output.
    ///
    /// Touches the dialog only while it still shows `phase`, and the stored
    /// output only while the same project is loaded and an output exists.
    pub async fn apply_enrichment(&mut self, project_id: &str, phase: Phase, field: &str, content: &str) {
        if self.project_id() != Some(project_id) {
            debug!(project_id, phase = %phase, "project changed, dropping enrichment");
            return;
        }

        if self.dialog.phase == Some(phase) {
            if let Some(output) = self.dialog.output.as_ref() {
                self.dialog.output = Some(merge_field(output, field, content));
            }
        }

        if !self.storage.phase_outputs().contains_key(&phase) {
            return;
        }

        let field = field.to_string();
        let content = content.to_string();
        self.storage
            .set_phase_outputs_and_persist(Update::apply(move |prev: &PhaseOutputs| {
                let mut next = prev.clone();
                if let Some(existing) = next.get(&phase) {
                    let merged = merge_field(existing, &field, &content);
                    next.insert(phase, merged);
                }
                next
            }))
            .await;
    }

    pub fn close_dialog(&mut self) {
        self.dialog.open = false;
    }

    pub fn set_progress(&mut self, progress: ProjectProgress) {
        self.progress = Some(progress);
    }

    /// Drop all run state and load another project's cached outputs.
    pub async fn switch_project(&mut self, project_id: Option<&str>) {
        self.runs.clear();
        self.running.clear();
        self.activity.clear();
        self.dialog = CompletionDialog::default();
        self.progress = None;
        self.storage.switch_project(project_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryKeyValueStore;
    use serde_json::json;

    async fn state_for(project: &str) -> CockpitState {
        let store = Arc::new(MemoryKeyValueStore::new());
        CockpitState::new(CockpitStorage::open(store, Some(project)).await)
    }

    #[tokio::test]
    async fn test_complete_run_transition() {
        let mut state = state_for("p1").await;
        let phase = Phase::new(4).unwrap();
        let run = PhaseRun::new("p1", phase, "run-1");
        state.begin_run(phase, "run-1");

        let output = state
            .complete_run(&run, json!("{\"word_count\":500}"))
            .await
            .unwrap();

        assert_eq!(output, json!({"word_count": 500}));
        assert!(state.active_run(phase).is_none());
        assert!(state.running_phases().is_empty());
        assert!(state.dialog().open);
        assert_eq!(state.dialog().phase, Some(phase));
        assert_eq!(state.storage().phase_outputs()[&phase], output);
    }

    #[tokio::test]
    async fn test_stale_completion_is_ignored() {
        let mut state = state_for("p1").await;
        let phase = Phase::new(2).unwrap();
        state.begin_run(phase, "run-2");

        let stale = PhaseRun::new("p1", phase, "run-1");
        assert!(state.complete_run(&stale, json!({})).await.is_none());
        assert_eq!(state.active_run(phase), Some("run-2"));
        assert!(!state.dialog().open);
    }

    #[tokio::test]
    async fn test_enrichment_merges_into_dialog_and_storage() {
        let mut state = state_for("p1").await;
        let run = PhaseRun::new("p1", Phase::OUTLINE, "run-6");
        state.begin_run(Phase::OUTLINE, "run-6");
        state.complete_run(&run, json!({"a": 1})).await;

        state.apply_enrichment("p1", Phase::OUTLINE, "outline", "OUTLINE").await;

        let expected = json!({"a": 1, "outline": "OUTLINE"});
        assert_eq!(state.dialog().output.as_ref(), Some(&expected));
        assert_eq!(state.storage().phase_outputs()[&Phase::OUTLINE], expected);
    }

    #[tokio::test]
    async fn test_enrichment_for_other_project_is_dropped() {
        let mut state = state_for("p1").await;
        let run = PhaseRun::new("p1", Phase::OUTLINE, "run-6");
        state.begin_run(Phase::OUTLINE, "run-6");
        state.complete_run(&run, json!({"a": 1})).await;

        state.apply_enrichment("p2", Phase::OUTLINE, "outline", "OUTLINE").await;
        assert_eq!(state.storage().phase_outputs()[&Phase::OUTLINE], json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_switch_project_clears_runs() {
        let mut state = state_for("p1").await;
        let phase = Phase::new(1).unwrap();
        state.begin_run(phase, "run-1");

        state.switch_project(Some("p2")).await;
        assert!(state.active_run(phase).is_none());
        assert!(state.running_phases().is_empty());
        assert_eq!(state.project_id(), Some("p2"));
    }
}
