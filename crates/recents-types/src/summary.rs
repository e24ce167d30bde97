use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot text stored when a row is created without any message.
pub const PLACEHOLDER_LAST_MESSAGE: &str = "Tap to start chatting";

/// Denormalized summary of one (owner, partner) conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub owner_id: String,
    pub partner_id: String,
    pub partner_display_name: Option<String>,
    pub partner_avatar: Option<String>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationSummary {
    pub fn new(
        owner_id: impl Into<String>,
        partner_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            partner_id: partner_id.into(),
            partner_display_name: None,
            partner_avatar: None,
            last_message: None,
            last_message_at: None,
            unread_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Row inserted by unread clearing when the pair has no summary yet.
    pub fn placeholder(
        owner_id: impl Into<String>,
        partner_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            last_message: Some(PLACEHOLDER_LAST_MESSAGE.to_string()),
            last_message_at: Some(now),
            ..Self::new(owner_id, partner_id, now)
        }
    }

    pub fn clear_unread(&mut self, now: DateTime<Utc>) {
        self.unread_count = 0;
        self.updated_at = now;
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.owner_id, &self.partner_id)
    }
}

/// Partner identity details known to the profile directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerProfile {
    pub display_name: Option<String>,
    pub avatar: Option<String>,
}

/// Client-pushed view of one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryDelta {
    pub partner_id: Option<String>,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub last_message: Option<String>,
    pub last_seen: Option<DateTime<Utc>>,
    pub unread_count: Option<u32>,
}

/// Raw batch entry as submitted; may be malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub owner_id: Option<String>,
    pub delta: Option<SummaryDelta>,
}

impl BatchEntry {
    pub fn new(owner_id: impl Into<String>, delta: SummaryDelta) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
            delta: Some(delta),
        }
    }
}

/// A validated batch entry: both identities present and non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryUpdate {
    pub owner_id: String,
    pub partner_id: String,
    pub delta: SummaryDelta,
}
