use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::{Client, Collection, Database};
use recents_types::{ConversationSummary, SummaryUpdate, PLACEHOLDER_LAST_MESSAGE};

use super::{models::MongoSummary, store_unavailable, SUMMARY_COLLECTION};
use crate::error::{PersistError, Result};
use crate::trait_client::SummaryStore;

#[derive(Clone)]
pub struct MongoSummaryStore {
    client: Client,
    database: Database,
    collection: Collection<MongoSummary>,
}

impl MongoSummaryStore {
    pub fn new(client: &Client, database: &Database) -> Self {
        Self {
            client: client.clone(),
            database: database.clone(),
            collection: database.collection(SUMMARY_COLLECTION),
        }
    }
}

fn pair_filter(owner: &str, partner: &str) -> Document {
    doc! { "owner_id": owner, "partner_id": partner }
}

fn literal(value: impl Into<Bson>) -> Document {
    doc! { "$literal": value.into() }
}

/// Pipeline-form upsert for a client push.
///
/// Written as an aggregation pipeline so the unread ratchet is evaluated by
/// the server against the stored value, with no read-modify-write window.
fn push_pipeline(update: &SummaryUpdate, now: bson::DateTime) -> Vec<Document> {
    let delta = &update.delta;
    let incoming = i64::from(delta.unread_count.unwrap_or(0));
    let last_seen = delta
        .last_seen
        .map_or(Bson::Null, |at| Bson::DateTime(bson::DateTime::from_chrono(at)));

    vec![doc! {
        "$set": {
            "owner_id": literal(update.owner_id.as_str()),
            "partner_id": literal(update.partner_id.as_str()),
            "partner_display_name": literal(delta.display_name.clone()),
            "partner_avatar": literal(delta.avatar.clone()),
            "last_message": literal(delta.last_message.clone()),
            "last_message_at": literal(last_seen),
            "unread_count": {
                "$cond": [ { "$gt": [incoming, 0] }, incoming, { "$ifNull": ["$unread_count", 0_i64] } ]
            },
            "created_at": { "$ifNull": ["$created_at", now] },
            "updated_at": now,
        }
    }]
}

#[async_trait]
impl SummaryStore for MongoSummaryStore {
    async fn get_summary(&self, owner: &str, partner: &str) -> Result<Option<ConversationSummary>> {
        let row = self
            .collection
            .find_one(pair_filter(owner, partner))
            .await
            .map_err(store_unavailable)?;
        Ok(row.map(Into::into))
    }

    async fn put_summary(&self, summary: &ConversationSummary) -> Result<()> {
        self.collection
            .replace_one(
                pair_filter(&summary.owner_id, &summary.partner_id),
                MongoSummary::from(summary),
            )
            .upsert(true)
            .await
            .map_err(store_unavailable)?;
        Ok(())
    }

    async fn list_recent(&self, owner: &str, limit: usize) -> Result<Vec<ConversationSummary>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<MongoSummary> = self
            .collection
            .find(doc! { "owner_id": owner })
            .sort(doc! { "last_message_at": -1, "updated_at": -1 })
            .limit(limit)
            .await
            .map_err(store_unavailable)?
            .try_collect()
            .await
            .map_err(store_unavailable)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn apply_batch(&self, updates: &[SummaryUpdate]) -> Result<usize> {
        let mut session = self.client.start_session().await.map_err(store_unavailable)?;
        session
            .start_transaction()
            .await
            .map_err(|e| PersistError::BatchWriteFailed(e.to_string()))?;

        // Dropping the session with the transaction still open aborts it, so
        // an early return or a cancelled future rolls back as well.
        let now = bson::DateTime::now();
        for update in updates {
            let written = self
                .collection
                .update_one(
                    pair_filter(&update.owner_id, &update.partner_id),
                    push_pipeline(update, now),
                )
                .upsert(true)
                .session(&mut session)
                .await;

            if let Err(e) = written {
                if let Err(abort_err) = session.abort_transaction().await {
                    tracing::warn!("Failed to abort batch transaction: {}", abort_err);
                }
                return Err(PersistError::BatchWriteFailed(format!(
                    "upsert {}/{}: {}",
                    update.owner_id, update.partner_id, e
                )));
            }
        }

        session
            .commit_transaction()
            .await
            .map_err(|e| PersistError::BatchWriteFailed(e.to_string()))?;
        Ok(updates.len())
    }

    async fn clear_unread(&self, owner: &str, partner: &str) -> Result<()> {
        let now = bson::DateTime::now();
        self.collection
            .update_one(
                pair_filter(owner, partner),
                doc! {
                    "$set": { "unread_count": 0_i64, "updated_at": now },
                    "$setOnInsert": {
                        "partner_display_name": Bson::Null,
                        "partner_avatar": Bson::Null,
                        "last_message": PLACEHOLDER_LAST_MESSAGE,
                        "last_message_at": now,
                        "created_at": now,
                    },
                },
            )
            .upsert(true)
            .await
            .map_err(store_unavailable)?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(store_unavailable)?;
        Ok(())
    }
}
