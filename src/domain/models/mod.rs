//! Domain models

pub mod config;
pub mod outputs;
pub mod phase;
pub mod workflow;

pub use config::{ApiConfig, Config, LoggingConfig, PollingConfig, StorageConfig};
pub use outputs::{CockpitSnapshot, PanelStates, PhaseOutputs, SavedOutput, SavedOutputs, Update};
pub use phase::{Phase, PhaseActivity, PhaseRun, PhaseStatus};
pub use workflow::{
    merge_field, normalize_outputs, ArtifactContent, ExecutePhaseRequest, PhaseProgress,
    ProjectProgress, WorkflowStatus, COMPLETION_MARKER, LEGACY_OUTLINE_ARTIFACT_PATH,
    OUTLINE_ARTIFACT_PATH, OUTLINE_FIELD,
};
