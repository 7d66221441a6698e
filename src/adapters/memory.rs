//! In-memory key-value store.
//!
//! Backs the cockpit when the durable database cannot be opened (session-only
//! mode) and doubles as the store fake in tests. Failure injection mirrors a
//! store that is full or read-only.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::KeyValueStore;

#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent read fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write fail, as a full store would.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw access for assertions, bypassing failure injection.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn check_write(&self) -> DomainResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::StoreUnavailable("quota exceeded".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DomainError::StoreUnavailable("store unavailable".to_string()));
        }
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        self.check_write()?;
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> DomainResult<()> {
        self.check_write()?;
        self.lock().remove(key);
        Ok(())
    }

    async fn clear(&self) -> DomainResult<()> {
        self.check_write()?;
        self.lock().clear();
        Ok(())
    }
}
