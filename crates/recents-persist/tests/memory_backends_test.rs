use chrono::{DateTime, TimeZone, Utc};
use recents_persist::{
    InMemorySummaryCache, MemoryMessageFeed, MemoryProfileDirectory, MemorySummaryStore, MessageFeed,
    PersistError, ProfileDirectory, SummaryCache, SummaryStore,
};
use recents_types::{Message, PartnerProfile, SummaryDelta, SummaryUpdate};
use std::sync::Arc;
use std::time::Duration;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

#[tokio::test]
async fn test_backends_behind_trait_objects() {
    let memory_feed = Arc::new(MemoryMessageFeed::new());
    memory_feed.append(Message::new("alice", "bob", "one", at(100))).await;
    memory_feed.append(Message::new("alice", "bob", "two", at(100))).await;

    let feed: Arc<dyn MessageFeed> = memory_feed.clone();
    let activity = feed.partner_activity("bob").await.unwrap();
    assert_eq!(activity.len(), 1);
    // Equal timestamps keep the first row.
    assert_eq!(activity[0].last_content, "one");
    assert_eq!(activity[0].unread_count, 2);

    assert_eq!(feed.mark_seen("bob", "alice").await.unwrap(), 2);
    assert_eq!(feed.mark_seen("bob", "alice").await.unwrap(), 0);
    assert_eq!(feed.partner_activity("bob").await.unwrap()[0].unread_count, 0);
}

#[tokio::test]
async fn test_mark_seen_only_touches_incoming_messages() {
    let feed = MemoryMessageFeed::new();
    feed.append(Message::new("alice", "bob", "to bob", at(100))).await;
    feed.append(Message::new("bob", "alice", "to alice", at(200))).await;
    feed.append(Message::new("carol", "bob", "from carol", at(300))).await;

    assert_eq!(feed.mark_seen("bob", "alice").await.unwrap(), 1);

    let seen: Vec<(String, bool)> = feed
        .messages()
        .await
        .into_iter()
        .map(|m| (m.content, m.seen))
        .collect();
    assert_eq!(
        seen,
        vec![
            ("to bob".to_string(), true),
            ("to alice".to_string(), false),
            ("from carol".to_string(), false),
        ]
    );
}

#[tokio::test]
async fn test_offline_feed_reports_unavailable() {
    let feed = MemoryMessageFeed::new();
    feed.set_online(false);

    assert!(matches!(
        feed.partner_activity("bob").await,
        Err(PersistError::FeedUnavailable(_))
    ));
    assert!(feed.ping().await.is_err());
}

#[tokio::test]
async fn test_batch_on_same_pair_applies_in_order() {
    let store: Arc<dyn SummaryStore> = Arc::new(MemorySummaryStore::new());
    let update = |unread: Option<u32>, text: &str| SummaryUpdate {
        owner_id: "bob".to_string(),
        partner_id: "alice".to_string(),
        delta: SummaryDelta {
            partner_id: Some("alice".to_string()),
            last_message: Some(text.to_string()),
            unread_count: unread,
            ..SummaryDelta::default()
        },
    };

    let applied = store
        .apply_batch(&[update(Some(4), "first"), update(None, "second")])
        .await
        .unwrap();
    assert_eq!(applied, 2);

    let row = store.get_summary("bob", "alice").await.unwrap().unwrap();
    assert_eq!(row.unread_count, 4);
    assert_eq!(row.last_message.as_deref(), Some("second"));
    assert_eq!(row.last_message_at, None);
}

#[tokio::test]
async fn test_profile_directory_lookup() {
    let memory = Arc::new(MemoryProfileDirectory::new());
    memory
        .insert(
            "alice",
            PartnerProfile {
                display_name: Some("Alice".to_string()),
                avatar: None,
            },
        )
        .await;

    let directory: Arc<dyn ProfileDirectory> = memory;
    let profile = directory.lookup("alice").await.unwrap().unwrap();
    assert_eq!(profile.display_name.as_deref(), Some("Alice"));
    assert!(directory.lookup("nobody").await.unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_cache_entries_are_per_owner() {
    let cache: Arc<dyn SummaryCache> = Arc::new(InMemorySummaryCache::new());
    let store = MemorySummaryStore::new();
    store.clear_unread("bob", "alice").await.unwrap();
    let rows = store.list_recent("bob", 20).await.unwrap();

    cache.put("bob", rows.clone(), Duration::from_secs(30)).await.unwrap();
    cache.put("carol", Vec::new(), Duration::from_secs(5)).await.unwrap();

    tokio::time::advance(Duration::from_secs(10)).await;
    assert_eq!(cache.get("bob").await.unwrap(), Some(rows));
    assert_eq!(cache.get("carol").await.unwrap(), None);
}
