use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Document};
use mongodb::{Collection, Database};
use recents_types::PartnerActivity;

use super::{feed_unavailable, models::MongoPartnerActivity, MESSAGE_COLLECTION};
use crate::error::Result;
use crate::trait_client::MessageFeed;

#[derive(Clone)]
pub struct MongoMessageFeed {
    database: Database,
    collection: Collection<Document>,
}

impl MongoMessageFeed {
    pub fn new(database: &Database) -> Self {
        Self {
            database: database.clone(),
            collection: database.collection(MESSAGE_COLLECTION),
        }
    }
}

/// One `$group` pass: newest message per partner plus the unseen count of
/// messages addressed to `owner`.
fn activity_pipeline(owner: &str) -> Vec<Document> {
    // Inside expressions, `$literal` keeps ids that start with `$` from being
    // read as field paths.
    let literal = doc! { "$literal": owner };
    vec![
        doc! { "$match": { "$or": [ { "sender": owner }, { "receiver": owner } ] } },
        doc! { "$sort": { "timestamp": -1 } },
        doc! {
            "$group": {
                "_id": { "$cond": [ { "$eq": ["$sender", literal.clone()] }, "$receiver", "$sender" ] },
                "last_content": { "$first": "$content" },
                "last_timestamp": { "$first": "$timestamp" },
                "unread_count": {
                    "$sum": {
                        "$cond": [
                            { "$and": [ { "$eq": ["$receiver", literal] }, { "$ne": ["$seen", true] } ] },
                            1,
                            0
                        ]
                    }
                }
            }
        },
    ]
}

#[async_trait]
impl MessageFeed for MongoMessageFeed {
    async fn partner_activity(&self, owner: &str) -> Result<Vec<PartnerActivity>> {
        let rows: Vec<Document> = self
            .collection
            .aggregate(activity_pipeline(owner))
            .await
            .map_err(feed_unavailable)?
            .try_collect()
            .await
            .map_err(feed_unavailable)?;

        let mut activity = Vec::with_capacity(rows.len());
        for row in rows {
            let row: MongoPartnerActivity = bson::from_document(row)?;
            activity.push(row.into());
        }

        tracing::debug!(owner, partners = activity.len(), "Aggregated feed activity");
        Ok(activity)
    }

    async fn mark_seen(&self, owner: &str, partner: &str) -> Result<u64> {
        let result = self
            .collection
            .update_many(
                doc! { "sender": partner, "receiver": owner, "seen": { "$ne": true } },
                doc! { "$set": { "seen": true } },
            )
            .await
            .map_err(feed_unavailable)?;
        Ok(result.modified_count)
    }

    async fn ping(&self) -> Result<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(feed_unavailable)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_groups_by_partner() {
        let pipeline = activity_pipeline("$bob");
        assert_eq!(pipeline.len(), 3);

        let matched = pipeline[0].get_document("$match").unwrap();
        let clauses = matched.get_array("$or").unwrap();
        assert_eq!(clauses.len(), 2);

        let group = pipeline[2].get_document("$group").unwrap();
        assert!(group.contains_key("unread_count"));
        let partner = group.get_document("_id").unwrap().get_array("$cond").unwrap();
        let eq = partner[0].as_document().unwrap().get_array("$eq").unwrap();
        assert_eq!(eq[1], bson::Bson::Document(doc! { "$literal": "$bob" }));
    }
}
