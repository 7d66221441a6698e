//! Adapters implementing the domain ports.
//!
//! - `sqlite`: durable local store
//! - `memory`: session-only store and test fake
//! - `http`: workflow API client

pub mod http;
pub mod memory;
pub mod sqlite;

pub use http::{ApiError, WorkflowApiClient};
pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;
