use async_trait::async_trait;
use recents_types::PartnerProfile;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::trait_client::ProfileDirectory;

#[derive(Default)]
pub struct MemoryProfileDirectory {
    profiles: RwLock<HashMap<String, PartnerProfile>>,
}

impl MemoryProfileDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user_id: impl Into<String>, profile: PartnerProfile) {
        self.profiles.write().await.insert(user_id.into(), profile);
    }
}

#[async_trait]
impl ProfileDirectory for MemoryProfileDirectory {
    async fn lookup(&self, user_id: &str) -> Result<Option<PartnerProfile>> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }
}
