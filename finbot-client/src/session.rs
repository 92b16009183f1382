//! Typed access to persisted client state: the bearer token and per-user flags.

use finbot_types::{ChatError, KeyValueStore, Scope, StorageError};
use serde_json::Value;

/// Key of the bearer token in [`Scope::Global`].
pub const TOKEN_KEY: &str = "auth:token";

/// Key of the onboarding flag in each [`Scope::User`].
pub const ONBOARDING_KEY: &str = "onboarding:seen";

/// Wraps an injected [`KeyValueStore`] with the keys the client uses.
pub struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn inner(&self) -> &S {
        &self.store
    }

    /// The stored bearer token, if any.
    pub async fn token(&self) -> Result<Option<String>, StorageError> {
        match self.store.get(&Scope::Global, TOKEN_KEY).await? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(token)) => Ok(Some(token)),
            Some(other) => Err(StorageError::Serialization(format!(
                "expected token string, found {other}"
            ))),
        }
    }

    /// The stored bearer token, or an error when signed out.
    pub async fn require_token(&self) -> Result<String, ChatError> {
        self.token()
            .await?
            .ok_or_else(|| ChatError::InvalidConfig("no bearer token stored".into()))
    }

    /// Store a bearer token, replacing any previous one.
    pub async fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.store
            .set(&Scope::Global, TOKEN_KEY, Value::String(token.to_owned()))
            .await
    }

    /// Forget the bearer token.
    pub async fn clear_token(&self) -> Result<(), StorageError> {
        self.store.remove(&Scope::Global, TOKEN_KEY).await
    }

    /// Whether `user_id` has already been shown onboarding.
    pub async fn has_seen_onboarding(&self, user_id: &str) -> Result<bool, StorageError> {
        let value = self.store.get(&Scope::user(user_id), ONBOARDING_KEY).await?;
        Ok(matches!(value, Some(Value::Bool(true))))
    }

    /// Record that `user_id` has been shown onboarding.
    pub async fn mark_onboarding_seen(&self, user_id: &str) -> Result<(), StorageError> {
        self.store
            .set(&Scope::user(user_id), ONBOARDING_KEY, Value::Bool(true))
            .await
    }
}
