//! Phase-run status polling.
//!
//! A poll task walks `Idle -> Polling -> Completed` for one
//! `(project, phase, run)` tuple. The first status probe is issued as soon as
//! the task starts and then once per interval. Fetch errors are logged and the
//! loop simply waits for the next tick; there is no retry cap and no backoff.
//!
//! Probes for one run are serialized: the next tick is not awaited until the
//! previous request has resolved, so responses can never arrive out of order.
//! Every response is checked against the cancellation token and the state's
//! current run id under the state lock before it is applied.
//!
//! On completion the task publishes the result to [`CockpitState`] in one lock
//! acquisition, then runs outline enrichment (phase 6) and the progress
//! refresh schedule. Those follow-ups can fail independently without touching
//! what was already published.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::models::{
    PhaseRun, PhaseStatus, PollingConfig, LEGACY_OUTLINE_ARTIFACT_PATH, OUTLINE_ARTIFACT_PATH,
    OUTLINE_FIELD,
};
use crate::domain::ports::WorkflowApi;

use super::cockpit_state::SharedCockpitState;

/// Timing of the poll loop and of the post-completion refreshes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Interval between status probes.
    pub interval: Duration,
    /// Offsets (from completion) of the refetches after the immediate one.
    pub refresh_delays: Vec<Duration>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

impl From<&PollingConfig> for PollerConfig {
    fn from(config: &PollingConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.interval_ms),
            refresh_delays: config
                .refresh_delays_ms
                .iter()
                .copied()
                .map(Duration::from_millis)
                .collect(),
        }
    }
}

/// How a poll task ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The run completed; carries the published (pre-enrichment) output.
    Completed(Value),
    /// The handle was cancelled or dropped.
    Cancelled,
    /// The run stopped being current (cleared or replaced) before completing.
    Superseded,
}

/// Starts poll tasks against a shared cockpit state.
#[derive(Clone)]
pub struct WorkflowPoller {
    api: Arc<dyn WorkflowApi>,
    state: SharedCockpitState,
    config: PollerConfig,
}

impl WorkflowPoller {
    pub fn new(api: Arc<dyn WorkflowApi>, state: SharedCockpitState, config: PollerConfig) -> Self {
        Self { api, state, config }
    }

    pub const fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Spawn the poll task for `run`.
    ///
    /// The run must already be registered as current in the cockpit state
    /// (see `CockpitState::begin_run`), otherwise the task ends as
    /// [`PollOutcome::Superseded`] before probing.
    pub fn start(&self, run: PhaseRun) -> PollHandle {
        let token = CancellationToken::new();
        let task = PollTask {
            api: Arc::clone(&self.api),
            state: Arc::clone(&self.state),
            config: self.config.clone(),
            run: run.clone(),
            token: token.clone(),
        };

        PollHandle {
            run,
            token,
            join: Some(tokio::spawn(task.run())),
        }
    }
}

/// Owning handle of a poll task.
///
/// Cancelling (or dropping) the handle stops the timer and any in-flight
/// follow-up work; results that resolve afterwards are discarded. `cancel`
/// may be called any number of times.
pub struct PollHandle {
    run: PhaseRun,
    token: CancellationToken,
    join: Option<JoinHandle<PollOutcome>>,
}

impl PollHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Wait for the task, including enrichment and refreshes.
    pub async fn wait(mut self) -> PollOutcome {
        let Some(join) = self.join.take() else {
            return PollOutcome::Cancelled;
        };
        match join.await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(phase = %self.run.phase, run_id = %self.run.workflow_run_id, error = %err, "poll task aborted");
                PollOutcome::Cancelled
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

struct PollTask {
    api: Arc<dyn WorkflowApi>,
    state: SharedCockpitState,
    config: PollerConfig,
    run: PhaseRun,
    token: CancellationToken,
}

impl PollTask {
    async fn run(self) -> PollOutcome {
        let run = &self.run;
        info!(project_id = %run.project_id, phase = %run.phase, run_id = %run.workflow_run_id, "polling started");

        // The first tick of a tokio interval completes immediately.
        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = self.token.cancelled() => return self.cancelled(),
                _ = ticker.tick() => {}
            }

            if !self.state.lock().await.is_current(run) {
                debug!(phase = %run.phase, run_id = %run.workflow_run_id, "run no longer active, polling stopped");
                return PollOutcome::Superseded;
            }

            let response = tokio::select! {
                biased;
                () = self.token.cancelled() => return self.cancelled(),
                response = self.api.phase_status(&run.project_id, run.phase, &run.workflow_run_id) => response,
            };

            let status = match response {
                Ok(status) => status,
                Err(err) if err.is_transient() => {
                    debug!(phase = %run.phase, run_id = %run.workflow_run_id, error = %err, "status fetch failed, retrying next tick");
                    continue;
                }
                Err(err) => {
                    warn!(phase = %run.phase, run_id = %run.workflow_run_id, error = %err, "status fetch rejected, retrying next tick");
                    continue;
                }
            };

            if status.is_completed() {
                let published = {
                    let mut state = self.state.lock().await;
                    if self.token.is_cancelled() {
                        return self.cancelled();
                    }
                    state.complete_run(run, status.outputs).await
                };

                return match published {
                    Some(output) => {
                        self.after_completion().await;
                        PollOutcome::Completed(output)
                    }
                    None => PollOutcome::Superseded,
                };
            }

            if status.phase_status() == PhaseStatus::Failed {
                warn!(
                    phase = %run.phase,
                    run_id = %run.workflow_run_id,
                    error = status.error.as_deref().unwrap_or("unknown"),
                    "engine reports the phase as failed"
                );
            } else {
                debug!(phase = %run.phase, status = %status.status, progress = status.progress, "phase still running");
            }

            let mut state = self.state.lock().await;
            if self.token.is_cancelled() {
                return self.cancelled();
            }
            if state.is_current(run) {
                state.record_activity(run.phase, status.activity());
            }
        }
    }

    fn cancelled(&self) -> PollOutcome {
        debug!(phase = %self.run.phase, run_id = %self.run.workflow_run_id, "polling cancelled");
        PollOutcome::Cancelled
    }

    async fn after_completion(&self) {
        let enrichment = async {
            if self.run.phase.is_outline() {
                self.enrich_outline().await;
            }
        };

        tokio::select! {
            biased;
            () = self.token.cancelled() => {
                debug!(phase = %self.run.phase, "post-completion work cancelled");
            }
            _ = futures::future::join(enrichment, self.refresh_progress()) => {}
        }
    }

    async fn fetch_outline(&self) -> Option<String> {
        for path in [OUTLINE_ARTIFACT_PATH, LEGACY_OUTLINE_ARTIFACT_PATH] {
            match self.api.artifact(&self.run.project_id, path).await {
                Ok(artifact) => return Some(artifact.content),
                Err(err) => warn!(project_id = %self.run.project_id, path, error = %err, "outline fetch failed"),
            }
        }
        None
    }

    async fn enrich_outline(&self) {
        let Some(content) = self.fetch_outline().await else {
            warn!(project_id = %self.run.project_id, "outline unavailable, output left as published");
            return;
        };

        let mut state = self.state.lock().await;
        if self.token.is_cancelled() {
            return;
        }
        state
            .apply_enrichment(&self.run.project_id, self.run.phase, OUTLINE_FIELD, &content)
            .await;
        debug!(project_id = %self.run.project_id, "outline merged into phase output");
    }

    /// Refetch project progress now and at each configured offset, so the
    /// just-completed phase shows up once the engine has propagated it.
    async fn refresh_progress(&self) {
        let mut elapsed = Duration::ZERO;
        let schedule = std::iter::once(Duration::ZERO).chain(self.config.refresh_delays.iter().copied());

        for offset in schedule {
            sleep(offset.saturating_sub(elapsed)).await;
            elapsed = elapsed.max(offset);

            match self.api.project_progress(&self.run.project_id).await {
                Ok(progress) => {
                    let mut state = self.state.lock().await;
                    if self.token.is_cancelled() {
                        return;
                    }
                    if state.project_id() == Some(self.run.project_id.as_str()) {
                        state.set_progress(progress);
                    }
                }
                Err(err) => {
                    warn!(project_id = %self.run.project_id, error = %err, "progress refresh failed");
                }
            }
        }
    }
}
