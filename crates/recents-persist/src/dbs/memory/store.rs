use async_trait::async_trait;
use chrono::Utc;
use recents_types::{merge_push, ConversationSummary, SummaryUpdate};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::error::{PersistError, Result};
use crate::trait_client::SummaryStore;

type PairKey = (String, String);

fn pair_key(owner: &str, partner: &str) -> PairKey {
    (owner.to_string(), partner.to_string())
}

/// Summary table held in memory.
///
/// Batches are staged against a scratch map and committed under a single
/// write lock with no await in between, so a cancelled or failed batch leaves
/// no trace.
pub struct MemorySummaryStore {
    rows: RwLock<HashMap<PairKey, ConversationSummary>>,
    rejected_pairs: RwLock<HashSet<PairKey>>,
    online: AtomicBool,
}

impl MemorySummaryStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            rejected_pairs: RwLock::new(HashSet::new()),
            online: AtomicBool::new(true),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Make every batch write touching (owner, partner) fail, to exercise
    /// rollback.
    pub async fn reject_writes_for(&self, owner: &str, partner: &str) {
        self.rejected_pairs.write().await.insert(pair_key(owner, partner));
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn ensure_online(&self) -> Result<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(PersistError::StoreUnavailable("in-memory store is offline".to_string()))
        }
    }
}

impl Default for MemorySummaryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SummaryStore for MemorySummaryStore {
    async fn get_summary(&self, owner: &str, partner: &str) -> Result<Option<ConversationSummary>> {
        self.ensure_online()?;
        Ok(self.rows.read().await.get(&pair_key(owner, partner)).cloned())
    }

    async fn put_summary(&self, summary: &ConversationSummary) -> Result<()> {
        self.ensure_online()?;
        self.rows
            .write()
            .await
            .insert(pair_key(&summary.owner_id, &summary.partner_id), summary.clone());
        Ok(())
    }

    async fn list_recent(&self, owner: &str, limit: usize) -> Result<Vec<ConversationSummary>> {
        self.ensure_online()?;
        let rows = self.rows.read().await;

        let mut recent: Vec<ConversationSummary> = rows
            .values()
            .filter(|row| row.owner_id == owner)
            .cloned()
            .collect();
        // Newest message first; rows without a timestamp sink to the end.
        recent.sort_by(|a, b| {
            b.last_message_at
                .cmp(&a.last_message_at)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
        });
        recent.truncate(limit);
        Ok(recent)
    }

    async fn apply_batch(&self, updates: &[SummaryUpdate]) -> Result<usize> {
        self.ensure_online()?;
        let rejected = self.rejected_pairs.read().await.clone();
        let mut rows = self.rows.write().await;
        let now = Utc::now();

        let mut staged: HashMap<PairKey, ConversationSummary> = HashMap::new();
        for update in updates {
            let key = pair_key(&update.owner_id, &update.partner_id);
            if rejected.contains(&key) {
                return Err(PersistError::StoreUnavailable(format!(
                    "write to {}/{} rejected",
                    update.owner_id, update.partner_id
                )));
            }

            let merged = merge_push(staged.get(&key).or_else(|| rows.get(&key)), update, now);
            staged.insert(key, merged);
        }

        rows.extend(staged);
        Ok(updates.len())
    }

    async fn clear_unread(&self, owner: &str, partner: &str) -> Result<()> {
        self.ensure_online()?;
        let now = Utc::now();
        self.rows
            .write()
            .await
            .entry(pair_key(owner, partner))
            .and_modify(|row| row.clear_unread(now))
            .or_insert_with(|| ConversationSummary::placeholder(owner, partner, now));
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.ensure_online()
    }
}
