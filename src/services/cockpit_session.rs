//! Cockpit session: starts, watches and cancels phase runs for the active
//! project, and owns the poll handles.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Phase, PhaseRun, ProjectProgress, WorkflowStatus};
use crate::domain::ports::{KeyValueStore, WorkflowApi};

use super::cockpit_state::{CockpitState, SharedCockpitState};
use super::cockpit_storage::CockpitStorage;
use super::workflow_poller::{PollHandle, PollOutcome, PollerConfig, WorkflowPoller};

pub struct CockpitSession {
    api: Arc<dyn WorkflowApi>,
    state: SharedCockpitState,
    poller: WorkflowPoller,
    watchers: HashMap<Phase, PollHandle>,
}

impl CockpitSession {
    /// Open a session for `project_id`, loading its cached outputs.
    pub async fn open(
        api: Arc<dyn WorkflowApi>,
        store: Arc<dyn KeyValueStore>,
        project_id: Option<&str>,
        config: PollerConfig,
    ) -> Self {
        let storage = CockpitStorage::open(store, project_id).await;
        let state = CockpitState::shared(storage);
        let poller = WorkflowPoller::new(Arc::clone(&api), Arc::clone(&state), config);

        Self {
            api,
            state,
            poller,
            watchers: HashMap::new(),
        }
    }

    /// Shared state, for reading run activity, the dialog and outputs.
    pub fn state(&self) -> SharedCockpitState {
        Arc::clone(&self.state)
    }

    pub async fn project_id(&self) -> Option<String> {
        self.state.lock().await.project_id().map(str::to_string)
    }

    async fn require_project(&self) -> DomainResult<String> {
        self.project_id().await.ok_or(DomainError::NoActiveProject)
    }

    /// Ask the engine to execute `phase` and watch the run it creates.
    pub async fn start_phase(&mut self, phase: Phase, inputs: Map<String, Value>) -> DomainResult<PhaseRun> {
        let project_id = self.require_project().await?;
        let accepted = self.api.execute_phase(&project_id, phase, inputs).await?;

        let run_id = accepted
            .workflow_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| DomainError::ValidationFailed("execute response carried no workflow id".to_string()))?;

        info!(project_id = %project_id, phase = %phase, run_id = %run_id, "phase started");
        self.watch(phase, &run_id).await
    }

    /// Make `run_id` the active run of `phase` and start polling it.
    ///
    /// A watcher already running for the phase is cancelled first.
    pub async fn watch(&mut self, phase: Phase, run_id: &str) -> DomainResult<PhaseRun> {
        let project_id = self.require_project().await?;

        if let Some(previous) = self.watchers.remove(&phase) {
            previous.cancel();
        }

        self.state.lock().await.begin_run(phase, run_id);

        let run = PhaseRun::new(project_id, phase, run_id);
        let handle = self.poller.start(run.clone());
        self.watchers.insert(phase, handle);
        Ok(run)
    }

    /// Stop watching `phase` and ask the engine to cancel its run.
    ///
    /// Local state is cleared even when the remote request fails; that
    /// failure is still returned.
    pub async fn cancel(&mut self, phase: Phase) -> DomainResult<()> {
        if let Some(handle) = self.watchers.remove(&phase) {
            handle.cancel();
        }

        let run_id = self
            .state
            .lock()
            .await
            .clear_run(phase)
            .ok_or_else(|| DomainError::NoActiveRun(phase.number()))?;

        self.api.cancel_workflow(&run_id).await.inspect_err(|err| {
            warn!(phase = %phase, run_id = %run_id, error = %err, "remote cancel failed");
        })?;

        info!(phase = %phase, run_id = %run_id, "phase run cancelled");
        Ok(())
    }

    /// Wait for the watcher of `phase` to finish, including its follow-ups.
    pub async fn wait(&mut self, phase: Phase) -> DomainResult<PollOutcome> {
        let handle = self
            .watchers
            .remove(&phase)
            .ok_or_else(|| DomainError::NoActiveRun(phase.number()))?;
        Ok(handle.wait().await)
    }

    pub fn watched_phases(&self) -> Vec<Phase> {
        let mut phases: Vec<Phase> = self.watchers.keys().copied().collect();
        phases.sort_unstable();
        phases
    }

    /// Stop every watcher, drop run state and load `project_id`'s outputs.
    pub async fn switch_project(&mut self, project_id: Option<&str>) {
        for (_, handle) in self.watchers.drain() {
            handle.cancel();
        }
        self.state.lock().await.switch_project(project_id).await;
    }

    pub async fn close_dialog(&self) {
        self.state.lock().await.close_dialog();
    }

    /// One-shot status probe, outside of any watcher.
    pub async fn phase_status(&self, phase: Phase, run_id: &str) -> DomainResult<WorkflowStatus> {
        let project_id = self.require_project().await?;
        self.api.phase_status(&project_id, phase, run_id).await
    }

    /// Fetch and publish the project's progress summary.
    pub async fn refresh_progress(&self) -> DomainResult<ProjectProgress> {
        let project_id = self.require_project().await?;
        let progress = self.api.project_progress(&project_id).await?;

        let mut state = self.state.lock().await;
        if state.project_id() == Some(project_id.as_str()) {
            state.set_progress(progress.clone());
        }
        Ok(progress)
    }
}
