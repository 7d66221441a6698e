//! Wire types of the remote workflow API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::phase::{PhaseActivity, PhaseStatus};

/// Status value that ends polling for a run.
pub const COMPLETION_MARKER: &str = "completed";

/// Primary location of the outline artifact.
pub const OUTLINE_ARTIFACT_PATH: &str = "phase6_outputs/outline.md";

/// Location used by projects created before the outline moved to phase 6.
pub const LEGACY_OUTLINE_ARTIFACT_PATH: &str = "phase5_outputs/outline.md";

/// Field under which the outline text is merged into a phase output.
pub const OUTLINE_FIELD: &str = "outline";

/// Status payload for one phase run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatus {
    #[serde(default)]
    pub workflow_id: Option<String>,
    #[serde(default)]
    pub phase: Option<u32>,
    pub status: String,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub current_step: Option<String>,
    /// Either structured JSON or a serialized JSON string.
    #[serde(default)]
    pub outputs: Value,
    #[serde(default)]
    pub error: Option<String>,
}

impl WorkflowStatus {
    pub fn is_completed(&self) -> bool {
        self.status == COMPLETION_MARKER
    }

    pub fn phase_status(&self) -> PhaseStatus {
        PhaseStatus::from_wire(&self.status)
    }

    pub fn activity(&self) -> PhaseActivity {
        PhaseActivity {
            progress: self.progress,
            current_step: self.current_step.clone(),
        }
    }
}

/// Normalize a completion payload.
///
/// Serialized text is decoded into structured JSON; text that does not parse
/// is kept as-is. A missing payload becomes an empty object.
pub fn normalize_outputs(raw: Value) -> Value {
    match raw {
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::debug!(error = %err, "phase outputs are not JSON, keeping raw text");
                Value::String(text)
            }
        },
        Value::Null => Value::Object(Map::new()),
        other => other,
    }
}

/// Merge `field: content` into an output without dropping existing fields.
///
/// Non-object outputs are wrapped as `{"raw": <output>}` first. Applying the
/// same patch twice yields the same value.
pub fn merge_field(output: &Value, field: &str, content: &str) -> Value {
    let mut object = match output {
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("raw".to_string(), other.clone());
            map
        }
    };
    object.insert(field.to_string(), Value::String(content.to_string()));
    Value::Object(object)
}

/// Artifact body returned by the artifact endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactContent {
    pub content: String,
    #[serde(default)]
    pub path: Option<String>,
}

/// Request body for starting a phase.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutePhaseRequest {
    pub phase: u32,
    pub inputs: Map<String, Value>,
}

/// Progress of one phase inside [`ProjectProgress`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseProgress {
    pub phase: u32,
    pub status: PhaseStatus,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

/// Project-wide progress summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectProgress {
    pub project_id: String,
    #[serde(default)]
    pub overall_progress: f64,
    #[serde(default)]
    pub phases: Vec<PhaseProgress>,
    #[serde(default)]
    pub chapters_completed: u32,
    #[serde(default)]
    pub total_chapters: u32,
}
