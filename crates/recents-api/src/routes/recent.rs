use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use recents_types::{BatchEntry, RecentChat, SummaryDelta};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{ApiError, ApiResult},
    extract::ApiJson,
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RecentQuery {
    /// Must be `get`
    pub action: Option<String>,
    #[serde(alias = "ownerId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentChatsResponse {
    #[schema(value_type = Vec<Object>)]
    pub recent_chats: Vec<RecentChat>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchUpdateRequest {
    pub action: Option<String>,
    /// `{ownerId, summaryDelta: {partnerId, displayName, avatar, lastMessage,
    /// lastSeen, unreadCount}}` entries. `lastSeen` is RFC 3339, epoch
    /// milliseconds, or `YYYY-MM-DD hh:mm:ss` in UTC. Entries are decoded one
    /// by one; an entry that does not decode is skipped.
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub updates: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BatchUpdateResponse {
    pub success: bool,
    pub updated: usize,
    pub skipped: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClearUnreadRequest {
    pub action: Option<String>,
    #[serde(default, alias = "ownerId")]
    pub user_id: Option<String>,
    #[serde(default, alias = "partnerId")]
    pub chat_user_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Wire shape of one batch entry; both the current and the legacy client
/// field names are accepted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchEntryPayload {
    #[serde(default, alias = "userId")]
    owner_id: Option<String>,
    #[serde(default, alias = "chatData")]
    summary_delta: Option<SummaryDeltaPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDeltaPayload {
    #[serde(default, alias = "userId")]
    partner_id: Option<String>,
    #[serde(default, alias = "username")]
    display_name: Option<String>,
    #[serde(default, alias = "profile_picture")]
    avatar: Option<String>,
    #[serde(default)]
    last_message: Option<String>,
    #[serde(default, deserialize_with = "deserialize_last_seen")]
    last_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    unread_count: Option<u32>,
}

impl From<BatchEntryPayload> for BatchEntry {
    fn from(payload: BatchEntryPayload) -> Self {
        Self {
            owner_id: payload.owner_id,
            delta: payload.summary_delta.map(|delta| SummaryDelta {
                partner_id: delta.partner_id,
                display_name: delta.display_name,
                avatar: delta.avatar,
                last_message: delta.last_message,
                last_seen: delta.last_seen,
                unread_count: delta.unread_count,
            }),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LastSeenWire {
    Millis(i64),
    Text(String),
}

fn parse_last_seen(wire: LastSeenWire) -> Option<DateTime<Utc>> {
    match wire {
        LastSeenWire::Millis(ms) => Utc.timestamp_millis_opt(ms).single(),
        LastSeenWire::Text(text) => DateTime::parse_from_rfc3339(&text)
            .map(|at| at.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .map(|at| at.and_utc())
            }),
    }
}

fn deserialize_last_seen<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<LastSeenWire>::deserialize(deserializer)? {
        None => Ok(None),
        Some(wire) => parse_last_seen(wire)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("unrecognized lastSeen timestamp")),
    }
}

/// An entry that does not decode becomes an empty entry, which the writer
/// counts as malformed.
fn decode_entry(index: usize, value: serde_json::Value) -> BatchEntry {
    match serde_json::from_value::<BatchEntryPayload>(value) {
        Ok(payload) => payload.into(),
        Err(e) => {
            tracing::warn!(index, "Undecodable batch entry: {}", e);
            BatchEntry::default()
        }
    }
}

fn expect_action(action: Option<&str>, expected: &str, method: &str) -> ApiResult<()> {
    match action {
        Some(action) if action == expected => Ok(()),
        _ => Err(ApiError::invalid_action(method)),
    }
}

/// List an owner's recent conversations
///
/// Runs a synchronization pass, then serves the cached or freshly listed rows
#[utoipa::path(
    get,
    path = "/api/recent",
    params(RecentQuery),
    responses(
        (status = 200, description = "Recent conversations, newest first", body = RecentChatsResponse),
        (status = 400, description = "Invalid action or missing userId")
    ),
    tag = "recent"
)]
pub async fn get_recent(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecentQuery>,
) -> ApiResult<Json<RecentChatsResponse>> {
    expect_action(query.action.as_deref(), "get", "GET")?;

    let rows = state
        .service
        .recent_chats(query.user_id.as_deref().unwrap_or_default())
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(RecentChatsResponse {
        recent_chats: rows.iter().map(RecentChat::from).collect(),
    }))
}

/// Push client-side summary updates
#[utoipa::path(
    post,
    path = "/api/recent",
    request_body = BatchUpdateRequest,
    responses(
        (status = 200, description = "Well-formed entries applied", body = BatchUpdateResponse),
        (status = 400, description = "Invalid action or empty update list"),
        (status = 500, description = "Batch rolled back")
    ),
    tag = "recent"
)]
pub async fn post_recent(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<BatchUpdateRequest>,
) -> ApiResult<Json<BatchUpdateResponse>> {
    expect_action(req.action.as_deref(), "batchUpdate", "POST")?;

    let updates = match req.updates {
        Some(serde_json::Value::Array(updates)) if !updates.is_empty() => updates,
        _ => return Err(ApiError::BadRequest("Updates array is required".to_string())),
    };

    let entries = updates
        .into_iter()
        .enumerate()
        .map(|(index, value)| decode_entry(index, value))
        .collect();

    let outcome = state
        .service
        .batch_update(entries)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(BatchUpdateResponse {
        success: true,
        updated: outcome.applied,
        skipped: outcome.skipped,
    }))
}

/// Clear the unread counter of one conversation
#[utoipa::path(
    patch,
    path = "/api/recent",
    request_body = ClearUnreadRequest,
    responses(
        (status = 200, description = "Unread counter cleared", body = SuccessResponse),
        (status = 400, description = "Invalid action or missing identities")
    ),
    tag = "recent"
)]
pub async fn patch_recent(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ClearUnreadRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    expect_action(req.action.as_deref(), "clearUnread", "PATCH")?;

    state
        .service
        .clear_unread(
            req.user_id.as_deref().unwrap_or_default(),
            req.chat_user_id.as_deref().unwrap_or_default(),
        )
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(SuccessResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_entry_accepts_legacy_names() {
        let entry = decode_entry(
            0,
            json!({
                "userId": "bob",
                "chatData": {
                    "userId": "alice",
                    "username": "Alice",
                    "profile_picture": "alice.png",
                    "lastMessage": "hi",
                    "lastSeen": "2024-01-01T00:00:00Z",
                    "unreadCount": 2
                }
            }),
        );

        assert_eq!(entry.owner_id.as_deref(), Some("bob"));
        let delta = entry.delta.unwrap();
        assert_eq!(delta.partner_id.as_deref(), Some("alice"));
        assert_eq!(delta.display_name.as_deref(), Some("Alice"));
        assert_eq!(delta.avatar.as_deref(), Some("alice.png"));
        assert_eq!(delta.unread_count, Some(2));
        assert!(delta.last_seen.is_some());
    }

    #[test]
    fn test_undecodable_entry_becomes_empty() {
        let entry = decode_entry(0, json!({ "ownerId": "bob", "summaryDelta": { "unreadCount": -1 } }));
        assert_eq!(entry, BatchEntry::default());

        assert_eq!(decode_entry(1, json!("not an object")), BatchEntry::default());
    }

    #[test]
    fn test_last_seen_formats() {
        let expected = Utc.timestamp_opt(1_704_067_200, 0).unwrap();
        for last_seen in [
            json!("2024-01-01T00:00:00Z"),
            json!(1_704_067_200_000_i64),
            json!("2024-01-01 00:00:00"),
        ] {
            let entry = decode_entry(
                0,
                json!({ "ownerId": "bob", "summaryDelta": { "partnerId": "alice", "lastSeen": last_seen } }),
            );
            assert_eq!(entry.delta.unwrap().last_seen, Some(expected));
        }

        let entry = decode_entry(0, json!({ "ownerId": "bob", "summaryDelta": { "partnerId": "alice", "lastSeen": null } }));
        assert_eq!(entry.delta.unwrap().last_seen, None);

        let entry = decode_entry(0, json!({ "ownerId": "bob", "summaryDelta": { "partnerId": "alice", "lastSeen": "yesterday" } }));
        assert_eq!(entry, BatchEntry::default());
    }

    #[test]
    fn test_expect_action() {
        assert!(expect_action(Some("get"), "get", "GET").is_ok());
        assert!(expect_action(Some("delete"), "get", "GET").is_err());
        assert!(expect_action(None, "get", "GET").is_err());
    }
}
