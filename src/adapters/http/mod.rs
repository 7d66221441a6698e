//! Workflow API HTTP adapter.

pub mod client;
pub mod errors;

pub use client::WorkflowApiClient;
pub use errors::ApiError;
