#![deny(missing_docs)]
//! In-memory implementation of [`KeyValueStore`].
//!
//! Entries live in a `HashMap` behind a `RwLock`. Each key is prefixed
//! with its serialized [`Scope`], so the global token and per-user flags
//! never collide.

use async_trait::async_trait;
use finbot_types::{KeyValueStore, Scope, StorageError};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Ephemeral store for tests and short-lived sessions.
pub struct MemoryStore {
    data: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Number of entries across all scopes.
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    /// Whether the store holds no entries at all.
    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn scope_prefix(scope: &Scope) -> Result<String, StorageError> {
    serde_json::to_string(scope).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn composite_key(scope: &Scope, key: &str) -> Result<String, StorageError> {
    Ok(format!("{}\0{key}", scope_prefix(scope)?))
}

/// The caller-facing key, if `composite` belongs to the scope with `prefix`.
fn extract_key<'a>(composite: &'a str, prefix: &str) -> Option<&'a str> {
    composite
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('\0'))
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, scope: &Scope, key: &str) -> Result<Option<Value>, StorageError> {
        let ck = composite_key(scope, key)?;
        Ok(self.data.read().await.get(&ck).cloned())
    }

    async fn set(&self, scope: &Scope, key: &str, value: Value) -> Result<(), StorageError> {
        let ck = composite_key(scope, key)?;
        self.data.write().await.insert(ck, value);
        Ok(())
    }

    async fn remove(&self, scope: &Scope, key: &str) -> Result<(), StorageError> {
        let ck = composite_key(scope, key)?;
        self.data.write().await.remove(&ck);
        Ok(())
    }

    async fn list(&self, scope: &Scope, prefix: &str) -> Result<Vec<String>, StorageError> {
        let scope_prefix = scope_prefix(scope)?;
        let data = self.data.read().await;
        Ok(data
            .keys()
            .filter_map(|ck| extract_key(ck, &scope_prefix))
            .filter(|k| k.starts_with(prefix))
            .map(str::to_owned)
            .collect())
    }
}
