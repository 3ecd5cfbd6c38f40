//! Visitor-scoped key-value storage.
//!
//! The host runtime backs this with something durable per client
//! (cookies, edge KV). The component only needs synchronous get/set with
//! a retention scope, so the trait stays deliberately small.

use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

/// Errors raised by the backing store.
///
/// A failed read is kept apart from "key absent" so that a transient
/// store error does not mint a duplicate visitor identifier.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store read failed: {0}")]
    Read(String),

    #[error("store write failed: {0}")]
    Write(String),
}

/// Retention scope for stored values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Cleared when the visitor's session ends
    Session,
    /// Survives session resets for the lifetime of the backing store
    Infinite,
}

/// Key-value storage handle scoped to a single visitor client.
pub trait VisitorStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str, scope: Scope) -> Result<(), StoreError>;
}

/// In-memory store handle for one client.
///
/// Values live for the lifetime of the process regardless of scope. Used
/// by the bundled host adapter and in tests; durable deployments plug in
/// their own `VisitorStore`.
#[derive(Debug, Default)]
pub struct MemoryVisitorStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryVisitorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VisitorStore for MemoryVisitorStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self
            .values
            .lock()
            .map_err(|e| StoreError::Read(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str, _scope: Scope) -> Result<(), StoreError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| StoreError::Write(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
