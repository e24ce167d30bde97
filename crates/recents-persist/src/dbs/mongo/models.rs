use mongodb::bson::{self, oid::ObjectId};
use recents_types::{ConversationSummary, PartnerActivity, PartnerProfile};
use serde::{Deserialize, Serialize};

/// MongoDB-specific summary row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSummary {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub owner_id: String,
    pub partner_id: String,
    pub partner_display_name: Option<String>,
    pub partner_avatar: Option<String>,
    pub last_message: Option<String>,
    pub last_message_at: Option<bson::DateTime>,
    pub unread_count: i64,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

/// Output row of the feed `$group` stage
#[derive(Debug, Clone, Deserialize)]
pub struct MongoPartnerActivity {
    #[serde(rename = "_id")]
    pub partner_id: String,
    pub last_content: String,
    pub last_timestamp: bson::DateTime,
    pub unread_count: i64,
}

/// Subset of a user document read by the profile directory
#[derive(Debug, Clone, Deserialize)]
pub struct MongoUserProfile {
    #[serde(default, alias = "username")]
    pub display_name: Option<String>,
    #[serde(default, alias = "profile_picture")]
    pub avatar: Option<String>,
}

pub(crate) fn clamp_count(count: i64) -> u32 {
    u32::try_from(count.max(0)).unwrap_or(u32::MAX)
}

// Conversions between database-agnostic and MongoDB-specific models

impl From<&ConversationSummary> for MongoSummary {
    fn from(summary: &ConversationSummary) -> Self {
        Self {
            id: None,
            owner_id: summary.owner_id.clone(),
            partner_id: summary.partner_id.clone(),
            partner_display_name: summary.partner_display_name.clone(),
            partner_avatar: summary.partner_avatar.clone(),
            last_message: summary.last_message.clone(),
            last_message_at: summary.last_message_at.map(bson::DateTime::from_chrono),
            unread_count: i64::from(summary.unread_count),
            created_at: bson::DateTime::from_chrono(summary.created_at),
            updated_at: bson::DateTime::from_chrono(summary.updated_at),
        }
    }
}

impl From<MongoSummary> for ConversationSummary {
    fn from(row: MongoSummary) -> Self {
        Self {
            owner_id: row.owner_id,
            partner_id: row.partner_id,
            partner_display_name: row.partner_display_name,
            partner_avatar: row.partner_avatar,
            last_message: row.last_message,
            last_message_at: row.last_message_at.map(|at| at.to_chrono()),
            unread_count: clamp_count(row.unread_count),
            created_at: row.created_at.to_chrono(),
            updated_at: row.updated_at.to_chrono(),
        }
    }
}

impl From<MongoPartnerActivity> for PartnerActivity {
    fn from(row: MongoPartnerActivity) -> Self {
        Self {
            partner_id: row.partner_id,
            last_content: row.last_content,
            last_timestamp: row.last_timestamp.to_chrono(),
            unread_count: clamp_count(row.unread_count),
        }
    }
}

impl From<MongoUserProfile> for PartnerProfile {
    fn from(user: MongoUserProfile) -> Self {
        Self {
            display_name: user.display_name,
            avatar: user.avatar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_summary_conversion_keeps_fields() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let mut summary = ConversationSummary::new("bob", "alice", now);
        summary.last_message = Some("hi".to_string());
        summary.last_message_at = Some(now);
        summary.unread_count = 3;

        let back: ConversationSummary = MongoSummary::from(&summary).into();
        assert_eq!(back, summary);
    }

    #[test]
    fn test_negative_count_clamps_to_zero() {
        assert_eq!(clamp_count(-4), 0);
        assert_eq!(clamp_count(7), 7);
    }
}
