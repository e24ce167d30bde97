use async_trait::async_trait;
use recents_types::{ConversationSummary, PartnerActivity, PartnerProfile, SummaryUpdate};

use crate::error::Result;

/// Read side of the message log.
///
/// The aggregation is a single call so a backend can compute every partner in
/// one pass instead of one query per partner.
#[async_trait]
pub trait MessageFeed: Send + Sync {
    /// Latest message and unread count for every partner `owner` has
    /// exchanged messages with, in either direction.
    ///
    /// Fails with `FeedUnavailable` when the log cannot be reached.
    async fn partner_activity(&self, owner: &str) -> Result<Vec<PartnerActivity>>;

    /// Mark every unseen message sent by `partner` to `owner` as seen.
    /// Returns the number of messages flipped.
    async fn mark_seen(&self, owner: &str, partner: &str) -> Result<u64>;

    async fn ping(&self) -> Result<()>;
}

/// Keyed table of conversation summaries, one row per (owner, partner).
#[async_trait]
pub trait SummaryStore: Send + Sync {
    async fn get_summary(&self, owner: &str, partner: &str) -> Result<Option<ConversationSummary>>;

    /// Insert or replace the row keyed by the summary's (owner, partner).
    async fn put_summary(&self, summary: &ConversationSummary) -> Result<()>;

    /// Rows for `owner`, most recent conversation first, at most `limit`.
    async fn list_recent(&self, owner: &str, limit: usize) -> Result<Vec<ConversationSummary>>;

    /// Apply client-pushed updates with the ratchet merge, all or nothing.
    /// Returns the number of rows written.
    async fn apply_batch(&self, updates: &[SummaryUpdate]) -> Result<usize>;

    /// Zero the unread counter for the pair, inserting a placeholder row when
    /// none exists.
    async fn clear_unread(&self, owner: &str, partner: &str) -> Result<()>;

    async fn ping(&self) -> Result<()>;
}

/// Identity lookup for partner display details.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn lookup(&self, user_id: &str) -> Result<Option<PartnerProfile>>;
}
