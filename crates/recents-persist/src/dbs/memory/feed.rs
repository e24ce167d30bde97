use async_trait::async_trait;
use recents_types::{Message, PartnerActivity};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::error::{PersistError, Result};
use crate::trait_client::MessageFeed;

/// Append-only message log held in memory.
pub struct MemoryMessageFeed {
    messages: RwLock<Vec<Message>>,
    online: AtomicBool,
}

impl MemoryMessageFeed {
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
            online: AtomicBool::new(true),
        }
    }

    pub async fn append(&self, message: Message) {
        self.messages.write().await.push(message);
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    /// Simulate the log becoming unreachable (or reachable again).
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(PersistError::FeedUnavailable("in-memory feed is offline".to_string()))
        }
    }
}

impl Default for MemoryMessageFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageFeed for MemoryMessageFeed {
    async fn partner_activity(&self, owner: &str) -> Result<Vec<PartnerActivity>> {
        self.ensure_online()?;
        let messages = self.messages.read().await;

        let mut by_partner: BTreeMap<&str, PartnerActivity> = BTreeMap::new();
        for message in messages.iter() {
            let Some(partner) = message.partner_of(owner) else {
                continue;
            };
            let unread = u32::from(message.is_unread_for(owner));

            match by_partner.get_mut(partner) {
                Some(activity) => {
                    // Strictly newer only: on a tie the first row wins.
                    if message.timestamp > activity.last_timestamp {
                        activity.last_content = message.content.clone();
                        activity.last_timestamp = message.timestamp;
                    }
                    activity.unread_count += unread;
                }
                None => {
                    by_partner.insert(
                        partner,
                        PartnerActivity {
                            partner_id: partner.to_string(),
                            last_content: message.content.clone(),
                            last_timestamp: message.timestamp,
                            unread_count: unread,
                        },
                    );
                }
            }
        }

        Ok(by_partner.into_values().collect())
    }

    async fn mark_seen(&self, owner: &str, partner: &str) -> Result<u64> {
        self.ensure_online()?;
        let mut messages = self.messages.write().await;

        let mut flipped = 0;
        for message in messages
            .iter_mut()
            .filter(|m| m.sender == partner && m.is_unread_for(owner))
        {
            message.seen = true;
            flipped += 1;
        }
        Ok(flipped)
    }

    async fn ping(&self) -> Result<()> {
        self.ensure_online()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[tokio::test]
    async fn test_activity_groups_both_directions() {
        let feed = MemoryMessageFeed::new();
        feed.append(Message::new("alice", "bob", "hi bob", at(100))).await;
        feed.append(Message::new("bob", "alice", "hi alice", at(200))).await;
        feed.append(Message::new("carol", "bob", "yo", at(150))).await;
        feed.append(Message::new("carol", "dave", "not bob's", at(300))).await;

        let activity = feed.partner_activity("bob").await.unwrap();

        assert_eq!(activity.len(), 2);
        let alice = &activity[0];
        assert_eq!(alice.partner_id, "alice");
        assert_eq!(alice.last_content, "hi alice");
        assert_eq!(alice.last_timestamp, at(200));
        assert_eq!(alice.unread_count, 1);

        let carol = &activity[1];
        assert_eq!(carol.partner_id, "carol");
        assert_eq!(carol.unread_count, 1);
    }

    #[tokio::test]
    async fn test_activity_tie_keeps_first_row() {
        let feed = MemoryMessageFeed::new();
        feed.append(Message::new("alice", "bob", "first", at(100))).await;
        feed.append(Message::new("alice", "bob", "second", at(100))).await;

        let activity = feed.partner_activity("bob").await.unwrap();
        assert_eq!(activity[0].last_content, "first");
        assert_eq!(activity[0].unread_count, 2);
    }

    #[tokio::test]
    async fn test_mark_seen_only_touches_pair() {
        let feed = MemoryMessageFeed::new();
        feed.append(Message::new("alice", "bob", "one", at(100))).await;
        feed.append(Message::new("alice", "bob", "two", at(110))).await;
        feed.append(Message::new("bob", "alice", "reply", at(120))).await;
        feed.append(Message::new("carol", "bob", "other", at(130))).await;

        assert_eq!(feed.mark_seen("bob", "alice").await.unwrap(), 2);
        assert_eq!(feed.mark_seen("bob", "alice").await.unwrap(), 0);

        let activity = feed.partner_activity("bob").await.unwrap();
        let unread: Vec<(String, u32)> = activity
            .into_iter()
            .map(|a| (a.partner_id, a.unread_count))
            .collect();
        assert_eq!(unread, vec![("alice".to_string(), 0), ("carol".to_string(), 1)]);

        // The reply bob sent is still unseen from alice's side.
        let alice_view = feed.partner_activity("alice").await.unwrap();
        assert_eq!(alice_view[0].unread_count, 1);
    }

    #[tokio::test]
    async fn test_offline_feed_fails() {
        let feed = MemoryMessageFeed::new();
        feed.set_online(false);

        let err = feed.partner_activity("bob").await.unwrap_err();
        assert!(matches!(err, PersistError::FeedUnavailable(_)));
        assert!(feed.ping().await.is_err());
    }
}
