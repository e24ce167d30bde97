use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single row of the message feed.
///
/// Owned by the feed; the summary engine only reads it (and flips `seen`
/// when unread clearing is configured to mark the feed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender: String,
    pub receiver: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub seen: bool,
}

impl Message {
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender: sender.into(),
            receiver: receiver.into(),
            content: content.into(),
            timestamp,
            seen: false,
        }
    }

    /// The other side of the conversation as seen from `owner`, or `None`
    /// when `owner` took no part in this message.
    pub fn partner_of(&self, owner: &str) -> Option<&str> {
        if self.sender == owner {
            Some(&self.receiver)
        } else if self.receiver == owner {
            Some(&self.sender)
        } else {
            None
        }
    }

    /// Whether this message still counts against `owner`'s unread total.
    pub fn is_unread_for(&self, owner: &str) -> bool {
        self.receiver == owner && !self.seen
    }
}

/// Per-partner aggregate computed by the feed reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerActivity {
    pub partner_id: String,
    pub last_content: String,
    pub last_timestamp: DateTime<Utc>,
    pub unread_count: u32,
}
