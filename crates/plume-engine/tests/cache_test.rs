use plume_core::ContentId;
use plume_engine::cache::ActionCache;
use tempfile::TempDir;

fn id(slug: &str) -> ContentId {
    ContentId::from_canonical(format!("https://example.com/p/{slug}"))
}

#[tokio::test]
async fn record_action_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let mut cache = ActionCache::new(dir.path(), "testnet");
    cache.load().await;

    assert!(cache.record_action(&id("a"), "alice", "performed").await);
    assert!(!cache.record_action(&id("a"), "alice", "performed").await);

    let stats = cache.stats();
    assert_eq!(stats.count, 1);
    assert_eq!(stats.entries[0].content_id, id("a"));
    assert_eq!(stats.entries[0].reason, "performed");
}

#[tokio::test]
async fn entries_survive_reload() {
    let dir = TempDir::new().unwrap();
    {
        let mut cache = ActionCache::new(dir.path(), "testnet");
        cache.load().await;
        cache.record_action(&id("a"), "alice", "performed").await;
        cache.record_action(&id("b"), "alice", "found-comment").await;
    }

    let mut cache = ActionCache::new(dir.path(), "testnet");
    assert_eq!(cache.load().await, 2);
    assert!(cache.has_acted(&id("a")));
    assert!(cache.has_acted(&id("b")));
    assert!(!cache.has_acted(&id("c")));
}

#[tokio::test]
async fn missing_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    let mut cache = ActionCache::new(dir.path(), "testnet");
    assert_eq!(cache.load().await, 0);
}

#[tokio::test]
async fn corrupt_file_degrades_to_empty() {
    let dir = TempDir::new().unwrap();
    let mut cache = ActionCache::new(dir.path(), "testnet");
    std::fs::write(cache.path(), "{ not json ]").unwrap();

    assert_eq!(cache.load().await, 0);
    // And the cache stays usable.
    assert!(cache.record_action(&id("a"), "alice", "performed").await);
}

#[tokio::test]
async fn cache_file_is_per_platform() {
    let dir = TempDir::new().unwrap();
    let cache = ActionCache::new(dir.path(), "birdsite");
    assert!(
        cache
            .path()
            .to_string_lossy()
            .ends_with("birdsite-commented-posts.json")
    );
}
