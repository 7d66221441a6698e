//! HTTP client for the workflow API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, instrument};

use super::errors::ApiError;
use crate::domain::errors::DomainResult;
use crate::domain::models::{
    ApiConfig, ArtifactContent, ExecutePhaseRequest, Phase, ProjectProgress, WorkflowStatus,
};
use crate::domain::ports::WorkflowApi;

/// reqwest-backed [`WorkflowApi`].
///
/// One pooled client is reused for every request; failures are classified
/// into [`ApiError`] and surfaced to callers as domain errors. No retries
/// happen here: the poller's interval is the retry loop.
#[derive(Debug, Clone)]
pub struct WorkflowApiClient {
    http: Client,
    base_url: String,
}

impl WorkflowApiClient {
    /// Create a client for the API rooted at `config.base_url`.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(4)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request, check the status and decode the JSON body.
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(ApiError::from_status(status, body));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl WorkflowApi for WorkflowApiClient {
    #[instrument(skip(self), level = "debug")]
    async fn phase_status(
        &self,
        project_id: &str,
        phase: Phase,
        workflow_run_id: &str,
    ) -> DomainResult<WorkflowStatus> {
        let request = self
            .http
            .get(self.url(&format!("projects/{project_id}/phases/{phase}/status")))
            .query(&[("workflow_id", workflow_run_id)]);

        let status: WorkflowStatus = self.send_json(request).await?;
        debug!(status = %status.status, progress = status.progress, "phase status received");
        Ok(status)
    }

    #[instrument(skip(self), level = "debug")]
    async fn artifact(&self, project_id: &str, artifact_path: &str) -> DomainResult<ArtifactContent> {
        let path = artifact_path.trim_start_matches('/');
        let request = self
            .http
            .get(self.url(&format!("projects/{project_id}/artifacts/{path}")));
        Ok(self.send_json(request).await?)
    }

    #[instrument(skip(self, inputs), level = "debug")]
    async fn execute_phase(
        &self,
        project_id: &str,
        phase: Phase,
        inputs: Map<String, Value>,
    ) -> DomainResult<WorkflowStatus> {
        let body = ExecutePhaseRequest {
            phase: phase.number(),
            inputs,
        };
        let request = self
            .http
            .post(self.url(&format!("projects/{project_id}/phases/{phase}/execute")))
            .json(&body);
        Ok(self.send_json(request).await?)
    }

    #[instrument(skip(self), level = "debug")]
    async fn cancel_workflow(&self, workflow_run_id: &str) -> DomainResult<()> {
        let request = self
            .http
            .post(self.url(&format!("workflows/{workflow_run_id}/cancel")));
        let _: Value = self.send_json(request).await?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn project_progress(&self, project_id: &str) -> DomainResult<ProjectProgress> {
        let request = self.http.get(self.url(&format!("projects/{project_id}/progress")));
        Ok(self.send_json(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining_trims_slashes() {
        let client = WorkflowApiClient::new(&ApiConfig {
            base_url: "http://localhost:8000/api/".to_string(),
            timeout_secs: 5,
        })
        .unwrap();

        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(
            client.url("/projects/p1/progress"),
            "http://localhost:8000/api/projects/p1/progress"
        );
    }
}
