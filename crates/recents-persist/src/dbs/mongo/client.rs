use mongodb::bson::doc;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Database, IndexModel};
use std::time::Duration;

use super::{
    feed::MongoMessageFeed, models::MongoSummary, profiles::MongoProfileDirectory,
    store::MongoSummaryStore, store_unavailable, MESSAGE_COLLECTION, SUMMARY_COLLECTION,
};
use crate::error::{PersistError, Result};

#[derive(Debug, Clone)]
pub struct MongoSettings {
    pub uri: String,
    pub database: String,
    pub pool_size: u32,
    pub timeout: Duration,
}

/// Process-wide MongoDB handle shared by the feed, store and directory.
///
/// The driver connects lazily and keeps its own pool; every operation checks
/// a connection out and returns it when the operation future completes or is
/// dropped.
#[derive(Clone)]
pub struct MongoBackend {
    client: Client,
    database: Database,
}

impl MongoBackend {
    pub async fn connect(settings: &MongoSettings) -> Result<Self> {
        let mut options = ClientOptions::parse(&settings.uri)
            .await
            .map_err(|e| PersistError::StoreUnavailable(e.to_string()))?;
        options.app_name = Some("recents".to_string());
        options.max_pool_size = Some(settings.pool_size);
        options.connect_timeout = Some(settings.timeout);
        options.server_selection_timeout = Some(settings.timeout);

        let client = Client::with_options(options).map_err(store_unavailable)?;
        let database = client.database(&settings.database);

        tracing::info!(database = %settings.database, pool_size = settings.pool_size, "MongoDB client configured");

        Ok(Self { client, database })
    }

    /// Create the unique (owner, partner) index on the summary table and the
    /// lookup indexes the feed aggregation relies on.
    pub async fn ensure_indexes(&self) -> Result<()> {
        let summaries = self.database.collection::<MongoSummary>(SUMMARY_COLLECTION);
        summaries
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "owner_id": 1, "partner_id": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await
            .map_err(store_unavailable)?;
        summaries
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "owner_id": 1, "last_message_at": -1 })
                    .build(),
            )
            .await
            .map_err(store_unavailable)?;

        let messages = self.database.collection::<mongodb::bson::Document>(MESSAGE_COLLECTION);
        for keys in [
            doc! { "sender": 1, "timestamp": -1 },
            doc! { "receiver": 1, "seen": 1, "timestamp": -1 },
        ] {
            messages
                .create_index(IndexModel::builder().keys(keys).build())
                .await
                .map_err(store_unavailable)?;
        }

        Ok(())
    }

    pub fn message_feed(&self) -> MongoMessageFeed {
        MongoMessageFeed::new(&self.database)
    }

    pub fn summary_store(&self) -> MongoSummaryStore {
        MongoSummaryStore::new(&self.client, &self.database)
    }

    pub fn profile_directory(&self) -> MongoProfileDirectory {
        MongoProfileDirectory::new(&self.database)
    }
}
