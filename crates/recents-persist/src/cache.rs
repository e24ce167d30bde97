// Recent-chats cache (in-memory, TTL-based)

use async_trait::async_trait;
use recents_types::ConversationSummary;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::Instant;

use crate::error::{PersistError, Result};

/// Read-through cache of an owner's recent-chat list.
///
/// Entries are replaced wholesale or dropped, never edited in place.
#[async_trait]
pub trait SummaryCache: Send + Sync {
    async fn get(&self, owner: &str) -> Result<Option<Vec<ConversationSummary>>>;

    async fn put(&self, owner: &str, value: Vec<ConversationSummary>, ttl: Duration) -> Result<()>;

    async fn invalidate(&self, owner: &str) -> Result<()>;
}

pub fn cache_key(owner: &str) -> String {
    format!("recent_chats:{}", owner)
}

#[derive(Debug, Clone)]
struct CachedEntry {
    value: Vec<ConversationSummary>,
    expires_at: Instant,
}

impl CachedEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

pub struct InMemorySummaryCache {
    store: Arc<RwLock<HashMap<String, CachedEntry>>>,
}

impl InMemorySummaryCache {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clear all entries
    pub fn clear(&self) -> Result<()> {
        self.store.write().map_err(poisoned)?.clear();
        Ok(())
    }

    /// Remove expired entries (periodic cleanup)
    pub fn cleanup_expired(&self) -> Result<usize> {
        let mut store = self.store.write().map_err(poisoned)?;
        let before = store.len();
        store.retain(|_, entry| !entry.is_expired());
        Ok(before - store.len())
    }

    pub fn stats(&self) -> CacheStats {
        match self.store.read() {
            Ok(store) => {
                let total = store.len();
                let expired = store.values().filter(|entry| entry.is_expired()).count();

                CacheStats {
                    total_entries: total,
                    expired_entries: expired,
                    active_entries: total - expired,
                }
            }
            Err(_) => CacheStats::default(),
        }
    }
}

impl Default for InMemorySummaryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SummaryCache for InMemorySummaryCache {
    async fn get(&self, owner: &str) -> Result<Option<Vec<ConversationSummary>>> {
        let key = cache_key(owner);
        {
            let store = self.store.read().map_err(poisoned)?;
            match store.get(&key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        // Expired: drop it so the map does not keep dead lists around.
        self.store.write().map_err(poisoned)?.remove(&key);
        Ok(None)
    }

    async fn put(&self, owner: &str, value: Vec<ConversationSummary>, ttl: Duration) -> Result<()> {
        let entry = CachedEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.store.write().map_err(poisoned)?.insert(cache_key(owner), entry);
        Ok(())
    }

    async fn invalidate(&self, owner: &str) -> Result<()> {
        self.store.write().map_err(poisoned)?.remove(&cache_key(owner));
        Ok(())
    }
}

fn poisoned<T>(_: T) -> PersistError {
    PersistError::Cache("cache lock poisoned".to_string())
}

#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}
