use recents_persist::{MessageFeed, Result, SummaryStore};
use recents_types::ClearUnreadStrategy;
use std::sync::Arc;

/// Clears unread counters according to the configured strategy.
pub struct UnreadLifecycle {
    feed: Arc<dyn MessageFeed>,
    store: Arc<dyn SummaryStore>,
    strategy: ClearUnreadStrategy,
}

impl UnreadLifecycle {
    pub fn new(
        feed: Arc<dyn MessageFeed>,
        store: Arc<dyn SummaryStore>,
        strategy: ClearUnreadStrategy,
    ) -> Self {
        Self {
            feed,
            store,
            strategy,
        }
    }

    pub fn strategy(&self) -> ClearUnreadStrategy {
        self.strategy
    }

    pub async fn clear_unread(&self, owner: &str, partner: &str) -> Result<()> {
        if self.strategy == ClearUnreadStrategy::MarkSeen {
            let flipped = self.feed.mark_seen(owner, partner).await?;
            tracing::debug!(owner, partner, flipped, "Marked feed messages seen");
        }

        self.store.clear_unread(owner, partner).await?;
        tracing::info!(owner, partner, strategy = ?self.strategy, "Unread counter cleared");
        Ok(())
    }
}
