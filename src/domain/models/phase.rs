//! Phase identifiers, statuses and run tuples.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::errors::{DomainError, DomainResult};

/// One numbered stage of the workflow pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Phase(u32);

impl Phase {
    /// Highest phase number the engine knows about.
    pub const LAST: u32 = 8;

    /// Phase whose completion is enriched with the outline artifact.
    pub const OUTLINE: Self = Self(6);

    /// Validate and wrap a phase number (1..=8).
    pub fn new(number: u32) -> DomainResult<Self> {
        if (1..=Self::LAST).contains(&number) {
            Ok(Self(number))
        } else {
            Err(DomainError::InvalidPhase(number))
        }
    }

    pub const fn number(self) -> u32 {
        self.0
    }

    pub fn is_outline(self) -> bool {
        self == Self::OUTLINE
    }
}

impl TryFrom<u32> for Phase {
    type Error = DomainError;

    fn try_from(number: u32) -> Result<Self, Self::Error> {
        Self::new(number)
    }
}

impl From<Phase> for u32 {
    fn from(phase: Phase) -> Self {
        phase.0
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phase {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = s
            .trim()
            .parse::<u32>()
            .map_err(|_| DomainError::ValidationFailed(format!("not a phase number: {s}")))?;
        Self::new(number)
    }
}

/// Phase execution status as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseStatus {
    NotStarted,
    InProgress,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl PhaseStatus {
    /// Map a raw wire value; unrecognised values become `Unknown`.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "not-started" => Self::NotStarted,
            "in-progress" => Self::InProgress,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single phase run: `(project, phase, workflow run id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhaseRun {
    pub project_id: String,
    pub phase: Phase,
    pub workflow_run_id: String,
}

impl PhaseRun {
    pub fn new(project_id: impl Into<String>, phase: Phase, workflow_run_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            phase,
            workflow_run_id: workflow_run_id.into(),
        }
    }
}

/// Last observed progress of a running phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhaseActivity {
    pub progress: f64,
    pub current_step: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_bounds() {
        assert!(Phase::new(0).is_err());
        assert!(Phase::new(1).is_ok());
        assert!(Phase::new(8).is_ok());
        assert!(matches!(Phase::new(9), Err(DomainError::InvalidPhase(9))));
    }

    #[test]
    fn test_phase_parse() {
        assert_eq!("6".parse::<Phase>().unwrap(), Phase::OUTLINE);
        assert!(" 3 ".parse::<Phase>().is_ok());
        assert!("six".parse::<Phase>().is_err());
    }

    #[test]
    fn test_phase_deserialize_checks_range() {
        assert_eq!(serde_json::from_str::<Phase>("4").unwrap(), Phase::new(4).unwrap());
        assert!(serde_json::from_str::<Phase>("0").is_err());
        assert!(serde_json::from_str::<Phase>("42").is_err());
        assert_eq!(serde_json::to_string(&Phase::OUTLINE).unwrap(), "6");
    }

    #[test]
    fn test_phase_map_keys_check_range() {
        use std::collections::BTreeMap;

        let keyed: BTreeMap<Phase, u8> = serde_json::from_str(r#"{"2": 1, "8": 2}"#).unwrap();
        assert_eq!(keyed.len(), 2);
        assert_eq!(serde_json::to_string(&keyed).unwrap(), r#"{"2":1,"8":2}"#);

        assert!(serde_json::from_str::<BTreeMap<Phase, u8>>(r#"{"42": 1}"#).is_err());
        assert!(serde_json::from_str::<BTreeMap<Phase, u8>>(r#"{"0": 1}"#).is_err());
    }

    #[test]
    fn test_status_from_wire() {
        assert_eq!(PhaseStatus::from_wire("completed"), PhaseStatus::Completed);
        assert_eq!(PhaseStatus::from_wire("in-progress"), PhaseStatus::InProgress);
        assert_eq!(PhaseStatus::from_wire("running"), PhaseStatus::Unknown);
    }

    #[test]
    fn test_status_deserialize_other() {
        let status: PhaseStatus = serde_json::from_str("\"queued\"").unwrap();
        assert_eq!(status, PhaseStatus::Unknown);
    }
}
