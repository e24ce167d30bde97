use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::{Collection, Database};
use recents_types::PartnerProfile;

use super::{models::MongoUserProfile, store_unavailable, USER_COLLECTION};
use crate::error::Result;
use crate::trait_client::ProfileDirectory;

#[derive(Clone)]
pub struct MongoProfileDirectory {
    collection: Collection<MongoUserProfile>,
}

impl MongoProfileDirectory {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(USER_COLLECTION),
        }
    }
}

#[async_trait]
impl ProfileDirectory for MongoProfileDirectory {
    async fn lookup(&self, user_id: &str) -> Result<Option<PartnerProfile>> {
        let user = self
            .collection
            .find_one(doc! { "_id": user_id })
            .projection(doc! { "display_name": 1, "username": 1, "avatar": 1, "profile_picture": 1 })
            .await
            .map_err(store_unavailable)?;
        Ok(user.map(Into::into))
    }
}
