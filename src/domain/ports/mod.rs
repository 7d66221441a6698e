//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters must implement:
//! - KeyValueStore: durable local string store
//! - WorkflowApi: remote workflow engine operations
//!
//! These traits keep the cockpit services independent of `SQLite` and HTTP.

pub mod key_value_store;
pub mod workflow_api;

pub use key_value_store::KeyValueStore;
pub use workflow_api::WorkflowApi;
