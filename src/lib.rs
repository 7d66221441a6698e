//! Weaver cockpit - client-side workflow cockpit for the Novel Weaver engine
//!
//! The cockpit starts phase runs on the remote engine, polls them to
//! completion, caches their outputs per project and remembers UI state
//! (panel visibility, active project) in a durable local store.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors and the port traits
//! - **Adapters** (`adapters`): `SQLite` and in-memory stores, HTTP API client
//! - **Service Layer** (`services`): scoped store, panel state, cockpit
//!   storage, workflow poller and the cockpit session
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): the `weaver` command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use weaver_cockpit::{CockpitSession, MemoryKeyValueStore, PollerConfig, WorkflowApiClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let api = Arc::new(WorkflowApiClient::new(&Default::default())?);
//!     let store = Arc::new(MemoryKeyValueStore::new());
//!     let mut session = CockpitSession::open(api, store, Some("noir-novel"), PollerConfig::default()).await;
//!     let run = session.start_phase("2".parse()?, Default::default()).await?;
//!     session.wait(run.phase).await?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::{MemoryKeyValueStore, SqliteKeyValueStore, WorkflowApiClient};
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Config, Phase, PhaseOutputs, PhaseRun, PhaseStatus, SavedOutput, SavedOutputs, Update,
    WorkflowStatus,
};
pub use domain::ports::{KeyValueStore, WorkflowApi};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    CockpitSession, CockpitStorage, PanelVisibility, PollHandle, PollOutcome, PollerConfig,
    ProjectScope, ScopedLocalStore, WorkflowPoller,
};
