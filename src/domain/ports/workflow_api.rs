use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::errors::DomainResult;
use crate::domain::models::{ArtifactContent, Phase, ProjectProgress, WorkflowStatus};

/// Remote workflow engine, as observed through its HTTP contract.
#[async_trait]
pub trait WorkflowApi: Send + Sync {
    /// Status of a phase run.
    ///
    /// # Arguments
    /// * `project_id` - Project owning the run
    /// * `phase` - Phase being executed
    /// * `workflow_run_id` - Run identifier returned when the phase was started
    async fn phase_status(
        &self,
        project_id: &str,
        phase: Phase,
        workflow_run_id: &str,
    ) -> DomainResult<WorkflowStatus>;

    /// Fetch a named artifact (e.g. `phase6_outputs/outline.md`).
    async fn artifact(&self, project_id: &str, artifact_path: &str) -> DomainResult<ArtifactContent>;

    /// Start a phase; the returned status carries the new workflow id.
    async fn execute_phase(
        &self,
        project_id: &str,
        phase: Phase,
        inputs: Map<String, Value>,
    ) -> DomainResult<WorkflowStatus>;

    /// Ask the engine to cancel a running workflow.
    async fn cancel_workflow(&self, workflow_run_id: &str) -> DomainResult<()>;

    /// Project-wide progress summary.
    async fn project_progress(&self, project_id: &str) -> DomainResult<ProjectProgress>;
}
