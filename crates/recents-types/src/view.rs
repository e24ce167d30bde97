use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::summary::{ConversationSummary, PLACEHOLDER_LAST_MESSAGE};

/// Client-facing rendering of one summary row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentChat {
    pub partner_id: String,
    pub partner_display_name: Option<String>,
    pub partner_avatar_ref: Option<String>,
    pub last_message: String,
    pub last_seen: DateTime<Utc>,
    pub unread_count: u32,
}

impl From<&ConversationSummary> for RecentChat {
    fn from(row: &ConversationSummary) -> Self {
        Self {
            partner_id: row.partner_id.clone(),
            partner_display_name: row.partner_display_name.clone(),
            partner_avatar_ref: row.partner_avatar.clone(),
            last_message: row
                .last_message
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_LAST_MESSAGE.to_string()),
            last_seen: row.last_message_at.unwrap_or(row.updated_at),
            unread_count: row.unread_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_row_renders_placeholder() {
        let updated = Utc.timestamp_opt(42, 0).unwrap();
        let chat = RecentChat::from(&ConversationSummary::new("bob", "alice", updated));

        assert_eq!(chat.last_message, PLACEHOLDER_LAST_MESSAGE);
        assert_eq!(chat.last_seen, updated);
    }

    #[test]
    fn test_serializes_camel_case() {
        let now = Utc.timestamp_opt(42, 0).unwrap();
        let mut row = ConversationSummary::new("bob", "alice", now);
        row.partner_avatar = Some("a.png".to_string());
        row.unread_count = 2;

        let json = serde_json::to_value(RecentChat::from(&row)).unwrap();
        assert_eq!(json["partnerId"], "alice");
        assert_eq!(json["partnerAvatarRef"], "a.png");
        assert_eq!(json["unreadCount"], 2);
    }
}
