use recents_persist::{MessageFeed, PersistError, ProfileDirectory, Result, SummaryCache, SummaryStore};
use recents_types::{BatchEntry, ConversationSummary, SyncConfig};
use std::sync::Arc;

use crate::batch::{affected_owners, BatchOutcome, BatchUpsertWriter};
use crate::synchronizer::Synchronizer;
use crate::normalize_id;
use crate::unread::UnreadLifecycle;

/// Entry point for the three client-facing operations.
///
/// Reads run a synchronization pass and then go through the cache; writes go
/// straight to the store and only touch the cache when `invalidate_on_write`
/// is set.
pub struct RecentsService {
    synchronizer: Synchronizer,
    writer: BatchUpsertWriter,
    unread: UnreadLifecycle,
    feed: Arc<dyn MessageFeed>,
    store: Arc<dyn SummaryStore>,
    cache: Arc<dyn SummaryCache>,
    config: SyncConfig,
}

impl RecentsService {
    pub fn builder() -> RecentsServiceBuilder {
        RecentsServiceBuilder::new()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub async fn recent_chats(&self, owner: &str) -> Result<Vec<ConversationSummary>> {
        let owner = normalize_id(owner, "userId")?;
        self.synchronizer.sync(&owner).await?;

        match self.cache.get(&owner).await {
            Ok(Some(cached)) => {
                tracing::debug!(owner = %owner, "Recent chats served from cache");
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(owner = %owner, "Cache read failed, falling back to store: {}", e),
        }

        let recent = self.store.list_recent(&owner, self.config.recent_limit).await?;
        if let Err(e) = self
            .cache
            .put(&owner, recent.clone(), self.config.cache_ttl)
            .await
        {
            tracing::warn!(owner = %owner, "Cache write failed: {}", e);
        }
        Ok(recent)
    }

    pub async fn batch_update(&self, entries: Vec<BatchEntry>) -> Result<BatchOutcome> {
        let owners = if self.config.invalidate_on_write {
            affected_owners(&entries)
        } else {
            Vec::new()
        };

        let outcome = self.writer.batch_upsert(entries).await?;
        for owner in &owners {
            self.invalidate(owner).await;
        }
        Ok(outcome)
    }

    pub async fn clear_unread(&self, owner: &str, partner: &str) -> Result<()> {
        let owner = normalize_id(owner, "userId")?;
        let partner = normalize_id(partner, "chatUserId")?;

        self.unread.clear_unread(&owner, &partner).await?;
        if self.config.invalidate_on_write {
            self.invalidate(&owner).await;
        }
        Ok(())
    }

    /// Store and feed reachability, in that order.
    pub async fn ping(&self) -> (Result<()>, Result<()>) {
        (self.store.ping().await, self.feed.ping().await)
    }

    async fn invalidate(&self, owner: &str) {
        if let Err(e) = self.cache.invalidate(owner).await {
            tracing::warn!(owner, "Cache invalidation failed: {}", e);
        }
    }
}

pub struct RecentsServiceBuilder {
    feed: Option<Arc<dyn MessageFeed>>,
    store: Option<Arc<dyn SummaryStore>>,
    profiles: Option<Arc<dyn ProfileDirectory>>,
    cache: Option<Arc<dyn SummaryCache>>,
    config: SyncConfig,
}

impl RecentsServiceBuilder {
    pub fn new() -> Self {
        Self {
            feed: None,
            store: None,
            profiles: None,
            cache: None,
            config: SyncConfig::default(),
        }
    }

    pub fn feed(mut self, feed: Arc<dyn MessageFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn store(mut self, store: Arc<dyn SummaryStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn profiles(mut self, profiles: Arc<dyn ProfileDirectory>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    pub fn cache(mut self, cache: Arc<dyn SummaryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<RecentsService> {
        let feed = self
            .feed
            .ok_or_else(|| PersistError::Internal("feed is required".to_string()))?;
        let store = self
            .store
            .ok_or_else(|| PersistError::Internal("store is required".to_string()))?;
        let cache = self
            .cache
            .ok_or_else(|| PersistError::Internal("cache is required".to_string()))?;

        let mut synchronizer = Synchronizer::new(Arc::clone(&feed), Arc::clone(&store));
        if let Some(profiles) = self.profiles {
            synchronizer = synchronizer.with_profiles(profiles);
        }

        Ok(RecentsService {
            synchronizer,
            writer: BatchUpsertWriter::new(Arc::clone(&store)),
            unread: UnreadLifecycle::new(Arc::clone(&feed), Arc::clone(&store), self.config.clear_strategy),
            feed,
            store,
            cache,
            config: self.config,
        })
    }
}

impl Default for RecentsServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
