use chrono::Utc;
use plume_core::protocol::{Cookie, StorageState};
use plume_engine::session::{SessionMetadata, SessionRecord, SessionStore};
use tempfile::TempDir;

fn record(platform: &str, handle: &str) -> SessionRecord {
    let mut storage = StorageState::default();
    storage
        .local
        .insert("auth_token".to_string(), "tok123".to_string());
    SessionRecord {
        cookies: vec![Cookie {
            name: "sid".to_string(),
            value: "abc".to_string(),
            domain: Some(".example.com".to_string()),
            path: Some("/".to_string()),
            expires: None,
            http_only: Some(true),
            secure: Some(true),
        }],
        storage,
        metadata: SessionMetadata {
            platform: platform.to_string(),
            saved_at: Utc::now(),
            assistant_id: Some("asst_42".to_string()),
            handle: Some(handle.to_string()),
        },
    }
}

#[tokio::test]
async fn round_trip_preserves_artifacts() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::new(dir.path());

    store
        .save("testnet", "default", &record("testnet", "alice"))
        .await
        .unwrap();
    let loaded = store.load("testnet", "default").await.unwrap();

    assert_eq!(loaded.cookies.len(), 1);
    assert_eq!(loaded.cookies[0].name, "sid");
    assert_eq!(loaded.cookies[0].value, "abc");
    assert_eq!(
        loaded.storage.local.get("auth_token").map(String::as_str),
        Some("tok123")
    );
    assert_eq!(loaded.metadata.handle.as_deref(), Some("alice"));
}

#[tokio::test]
async fn metadata_is_retrievable_independently() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::new(dir.path());
    store
        .save("testnet", "default", &record("testnet", "alice"))
        .await
        .unwrap();

    let meta = store.metadata("testnet", "default").await.unwrap();
    assert_eq!(meta.platform, "testnet");
    assert_eq!(meta.assistant_id.as_deref(), Some("asst_42"));
}

#[tokio::test]
async fn delete_logs_out() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::new(dir.path());
    store
        .save("testnet", "default", &record("testnet", "alice"))
        .await
        .unwrap();

    store.delete("testnet", "default").await.unwrap();
    assert!(store.load("testnet", "default").await.is_none());
    // Deleting an absent session is not an error.
    store.delete("testnet", "default").await.unwrap();
}

#[tokio::test]
async fn missing_session_is_none() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::new(dir.path());
    assert!(store.load("testnet", "default").await.is_none());
}

#[tokio::test]
async fn corrupt_session_is_treated_as_logged_out() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::new(dir.path());
    std::fs::write(store.session_path("testnet", "default"), "not json").unwrap();

    assert!(store.load("testnet", "default").await.is_none());
}

#[tokio::test]
async fn sessions_are_keyed_by_platform_and_name() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::new(dir.path());
    store
        .save("testnet", "work", &record("testnet", "alice"))
        .await
        .unwrap();
    store
        .save("othernet", "work", &record("othernet", "bob"))
        .await
        .unwrap();

    let a = store.load("testnet", "work").await.unwrap();
    let b = store.load("othernet", "work").await.unwrap();
    assert_eq!(a.metadata.handle.as_deref(), Some("alice"));
    assert_eq!(b.metadata.handle.as_deref(), Some("bob"));
    assert!(store.load("testnet", "personal").await.is_none());
}
