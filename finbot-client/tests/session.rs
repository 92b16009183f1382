use finbot_client::{FinBot, FinBotConfig, SessionStore};
use finbot_client::session::{ONBOARDING_KEY, TOKEN_KEY};
use finbot_state_memory::MemoryStore;
use finbot_types::{ChatError, KeyValueStore, Scope, StorageError};

#[tokio::test]
async fn token_roundtrip() {
    let session = SessionStore::new(MemoryStore::new());
    assert_eq!(session.token().await.unwrap(), None);

    session.set_token("jwt-1").await.unwrap();
    assert_eq!(session.token().await.unwrap().as_deref(), Some("jwt-1"));

    session.set_token("jwt-2").await.unwrap();
    assert_eq!(session.token().await.unwrap().as_deref(), Some("jwt-2"));

    session.clear_token().await.unwrap();
    assert_eq!(session.token().await.unwrap(), None);
}

#[tokio::test]
async fn non_string_token_is_a_storage_error() {
    let store = MemoryStore::new();
    store
        .set(&Scope::Global, TOKEN_KEY, serde_json::json!(42))
        .await
        .unwrap();
    let session = SessionStore::new(store);
    assert!(matches!(
        session.token().await,
        Err(StorageError::Serialization(_))
    ));
}

#[tokio::test]
async fn onboarding_flags_are_per_user() {
    let session = SessionStore::new(MemoryStore::new());
    assert!(!session.has_seen_onboarding("ayse").await.unwrap());

    session.mark_onboarding_seen("ayse").await.unwrap();
    assert!(session.has_seen_onboarding("ayse").await.unwrap());
    assert!(!session.has_seen_onboarding("mehmet").await.unwrap());

    let keys = session
        .inner()
        .list(&Scope::user("ayse"), "onboarding:")
        .await
        .unwrap();
    assert_eq!(keys, vec![ONBOARDING_KEY.to_string()]);
}

#[tokio::test]
async fn client_from_session_uses_stored_token() {
    let session = SessionStore::new(MemoryStore::new());
    session.set_token("stored").await.unwrap();

    let client = FinBot::with_session(FinBotConfig::default(), &session)
        .await
        .unwrap();
    assert_eq!(client.config().token.as_deref(), Some("stored"));
}

#[tokio::test]
async fn client_from_empty_session_fails() {
    let session = SessionStore::new(MemoryStore::new());
    let result = FinBot::with_session(FinBotConfig::default(), &session).await;
    assert!(matches!(result, Err(ChatError::InvalidConfig(_))));
}
