//! Cached phase outputs, pinned artifacts and panel visibility maps.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::phase::Phase;

/// Phase number to opaque output payload.
pub type PhaseOutputs = BTreeMap<Phase, Value>;

/// Artifact id to pinned artifact.
pub type SavedOutputs = BTreeMap<String, SavedOutput>;

/// Panel id to open/closed flag.
pub type PanelStates = BTreeMap<String, bool>;

/// A user-pinned artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedOutput {
    pub content: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl SavedOutput {
    pub fn new(content: impl Into<String>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// The per-project blob persisted by cockpit storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CockpitSnapshot {
    #[serde(default)]
    pub saved_outputs: SavedOutputs,
    #[serde(default)]
    pub phase_outputs: PhaseOutputs,
}

/// A replacement value or a pure function of the previous value.
pub enum Update<T> {
    Replace(T),
    Apply(Box<dyn FnOnce(&T) -> T + Send>),
}

impl<T> Update<T> {
    /// Build a read-modify-write update.
    pub fn apply<F>(f: F) -> Self
    where
        F: FnOnce(&T) -> T + Send + 'static,
    {
        Self::Apply(Box::new(f))
    }

    /// Compute the next value from `previous`.
    pub fn resolve(self, previous: &T) -> T {
        match self {
            Self::Replace(next) => next,
            Self::Apply(f) => f(previous),
        }
    }
}

impl<T> From<T> for Update<T> {
    fn from(value: T) -> Self {
        Self::Replace(value)
    }
}
