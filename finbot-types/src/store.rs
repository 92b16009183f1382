//! Keyed state that outlives a single request.
//!
//! Bearer tokens and per-user onboarding flags live behind this trait
//! instead of in process globals, so they can be faked in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Namespace a key lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Scope {
    /// Shared by the whole client (e.g. the auth token).
    Global,
    /// Belongs to one user (e.g. onboarding flags).
    User(String),
}

impl Scope {
    /// Shorthand for [`Scope::User`].
    pub fn user(id: impl Into<String>) -> Self {
        Self::User(id.into())
    }
}

/// Injected key-value store.
///
/// Implementations:
/// - `MemoryStore` (finbot-state-memory): HashMap, ephemeral
/// - `FsStore` (finbot-state-fs): one JSON file per key
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `None` if the key is absent.
    async fn get(&self, scope: &Scope, key: &str)
    -> Result<Option<serde_json::Value>, StorageError>;

    /// Create or overwrite a value.
    async fn set(
        &self,
        scope: &Scope,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), StorageError>;

    /// Delete a value. No-op if the key is absent.
    async fn remove(&self, scope: &Scope, key: &str) -> Result<(), StorageError>;

    /// List keys under a prefix within a scope.
    async fn list(&self, scope: &Scope, prefix: &str) -> Result<Vec<String>, StorageError>;
}
