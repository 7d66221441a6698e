//! Domain errors for the weaver cockpit.

use thiserror::Error;

/// Domain-level errors that can occur at the port boundary.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Project not selected")]
    NoActiveProject,

    #[error("Invalid phase number: {0}")]
    InvalidPhase(u32),

    #[error("No active run for phase {0}")]
    NoActiveRun(u32),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Workflow API returned {status}: {message}")]
    ApiStatus { status: u16, message: String },

    #[error("Workflow API request failed: {0}")]
    ApiRequest(String),

    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl DomainError {
    /// Returns true for failures that a later attempt may not hit again.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::ApiRequest(_) | Self::StoreUnavailable(_) => true,
            Self::ApiStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::StoreUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
