use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How `clear_unread` makes a conversation read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearUnreadStrategy {
    /// Zero the summary row only. The next sync recomputes the counter from
    /// the feed, so the clear sticks only once the feed marks messages seen.
    ZeroSummary,
    /// Mark the feed messages seen, then zero the summary row.
    #[default]
    MarkSeen,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub cache_ttl: Duration,
    pub recent_limit: usize,
    pub clear_strategy: ClearUnreadStrategy,
    pub invalidate_on_write: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(30),
            recent_limit: 20,
            clear_strategy: ClearUnreadStrategy::default(),
            invalidate_on_write: false,
        }
    }
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self
    }

    pub fn with_clear_strategy(mut self, strategy: ClearUnreadStrategy) -> Self {
        self.clear_strategy = strategy;
        self
    }

    pub fn with_invalidate_on_write(mut self, enabled: bool) -> Self {
        self.invalidate_on_write = enabled;
        self
    }
}
