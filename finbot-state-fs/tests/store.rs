use finbot_state_fs::FsStore;
use finbot_types::{KeyValueStore, Scope, StorageError};
use serde_json::json;
use std::sync::Arc;

// --- Basic CRUD ---

#[tokio::test]
async fn set_then_get() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path());

    store.set(&Scope::Global, "auth:token", json!("tok")).await.unwrap();
    let val = store.get(&Scope::Global, "auth:token").await.unwrap();
    assert_eq!(val, Some(json!("tok")));
}

#[tokio::test]
async fn get_missing_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path());
    assert_eq!(store.get(&Scope::Global, "missing").await.unwrap(), None);
}

#[tokio::test]
async fn overwrite_replaces_value() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path());
    let scope = Scope::user("u1");

    store.set(&scope, "key1", json!(1)).await.unwrap();
    store.set(&scope, "key1", json!(2)).await.unwrap();

    assert_eq!(store.get(&scope, "key1").await.unwrap(), Some(json!(2)));
    assert_eq!(store.list(&scope, "").await.unwrap(), vec!["key1"]);
}

#[tokio::test]
async fn remove_deletes_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path());

    store.set(&Scope::Global, "auth:token", json!("tok")).await.unwrap();
    store.remove(&Scope::Global, "auth:token").await.unwrap();
    assert_eq!(store.get(&Scope::Global, "auth:token").await.unwrap(), None);
}

#[tokio::test]
async fn remove_missing_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path());
    store.remove(&Scope::Global, "nonexistent").await.unwrap();
}

// --- List ---

#[tokio::test]
async fn list_by_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path());
    let scope = Scope::user("u1");

    store.set(&scope, "onboarding:seen", json!(true)).await.unwrap();
    store.set(&scope, "onboarding:step", json!(3)).await.unwrap();
    store.set(&scope, "theme", json!("dark")).await.unwrap();

    let mut keys = store.list(&scope, "onboarding:").await.unwrap();
    keys.sort();
    assert_eq!(keys, vec!["onboarding:seen", "onboarding:step"]);
}

#[tokio::test]
async fn list_missing_scope_returns_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path().join("not-created-yet"));
    assert!(store.list(&Scope::Global, "").await.unwrap().is_empty());
}

// --- Scope isolation ---

#[tokio::test]
async fn scopes_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path());
    let u1 = Scope::user("u1");
    let u2 = Scope::user("u2");

    store.set(&Scope::Global, "key", json!("global")).await.unwrap();
    store.set(&u1, "key", json!("u1")).await.unwrap();

    assert_eq!(store.get(&Scope::Global, "key").await.unwrap(), Some(json!("global")));
    assert_eq!(store.get(&u1, "key").await.unwrap(), Some(json!("u1")));
    assert_eq!(store.get(&u2, "key").await.unwrap(), None);
}

// --- Persistence ---

#[tokio::test]
async fn values_survive_a_new_store_instance() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = FsStore::new(dir.path());
        store.set(&Scope::Global, "auth:token", json!("tok")).await.unwrap();
        store
            .set(&Scope::user("u1"), "onboarding:seen", json!(true))
            .await
            .unwrap();
    }

    let reopened = FsStore::new(dir.path());
    assert_eq!(
        reopened.get(&Scope::Global, "auth:token").await.unwrap(),
        Some(json!("tok"))
    );
    assert_eq!(
        reopened.get(&Scope::user("u1"), "onboarding:seen").await.unwrap(),
        Some(json!(true))
    );
}

#[tokio::test]
async fn corrupt_file_is_a_serialization_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path());
    store.set(&Scope::Global, "auth:token", json!("tok")).await.unwrap();

    std::fs::write(dir.path().join("global").join("auth%3Atoken.json"), "{not json").unwrap();

    let err = store.get(&Scope::Global, "auth:token").await.unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));
}

#[tokio::test]
async fn no_temp_files_left_after_set() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path());
    store.set(&Scope::Global, "auth:token", json!("tok")).await.unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path().join("global"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["auth%3Atoken.json"]);
}

// --- Concurrent access ---

#[tokio::test]
async fn concurrent_writes_to_same_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FsStore::new(dir.path()));
    let payload = |i: usize| json!({ "writer": i, "padding": "x".repeat(200_000) });

    for round in 0..10 {
        let mut handles = vec![];
        for i in 0..8 {
            let store = Arc::clone(&store);
            let value = payload(i);
            handles.push(tokio::spawn(async move {
                store.set(&Scope::Global, "k", value).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let stored = store.get(&Scope::Global, "k").await.unwrap().unwrap();
        let writer = stored["writer"].as_u64().unwrap() as usize;
        assert_eq!(stored, payload(writer), "round {round}");
    }

    let names: Vec<String> = std::fs::read_dir(dir.path().join("global"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["k.json"]);
}

#[tokio::test]
async fn concurrent_stores_on_one_root() {
    let dir = tempfile::tempdir().unwrap();
    let mut handles = vec![];
    for i in 0..8 {
        let root = dir.path().to_path_buf();
        handles.push(tokio::spawn(async move {
            FsStore::new(root)
                .set(&Scope::Global, "auth:token", json!(format!("tok-{i}")))
                .await
        }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    let token = FsStore::new(dir.path())
        .get(&Scope::Global, "auth:token")
        .await
        .unwrap();
    assert!(matches!(token, Some(serde_json::Value::String(t)) if t.starts_with("tok-")));
}

// --- Object safety ---

#[tokio::test]
async fn usable_as_arc_dyn_store() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FsStore::new(dir.path()));

    store.set(&Scope::Global, "key", json!("val")).await.unwrap();
    assert_eq!(
        store.get(&Scope::Global, "key").await.unwrap(),
        Some(json!("val"))
    );
}
