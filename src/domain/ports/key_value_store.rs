use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Durable string-keyed, string-valued store shared by every scope.
///
/// Implementations report failures through [`DomainResult`]; the services
/// layered on top turn failed reads into empty values and failed writes into
/// no-ops, so nothing here is ever fatal to a caller.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` when absent.
    async fn get(&self, key: &str) -> DomainResult<Option<String>>;

    /// Insert or overwrite `key`.
    async fn set(&self, key: &str, value: &str) -> DomainResult<()>;

    /// Remove `key`; removing an absent key succeeds.
    async fn remove(&self, key: &str) -> DomainResult<()>;

    /// Remove every entry.
    async fn clear(&self) -> DomainResult<()>;
}
