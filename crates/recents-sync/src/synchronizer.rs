use chrono::Utc;
use recents_persist::{MessageFeed, ProfileDirectory, Result, SummaryStore};
use recents_types::{merge_feed, PartnerProfile};
use std::sync::Arc;

/// Counts from one synchronization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub partners_scanned: usize,
    pub rows_written: usize,
}

/// Reconciles an owner's summary rows with the message feed.
///
/// Each partner is a separate read-then-upsert; there is no transaction
/// spanning partners, and rows that would not change are never written.
pub struct Synchronizer {
    feed: Arc<dyn MessageFeed>,
    store: Arc<dyn SummaryStore>,
    profiles: Option<Arc<dyn ProfileDirectory>>,
}

impl Synchronizer {
    pub fn new(feed: Arc<dyn MessageFeed>, store: Arc<dyn SummaryStore>) -> Self {
        Self {
            feed,
            store,
            profiles: None,
        }
    }

    pub fn with_profiles(mut self, profiles: Arc<dyn ProfileDirectory>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    pub async fn sync(&self, owner: &str) -> Result<SyncReport> {
        let activity = self.feed.partner_activity(owner).await?;
        let mut report = SyncReport {
            partners_scanned: activity.len(),
            rows_written: 0,
        };

        for partner in &activity {
            let profile = self.profile_for(&partner.partner_id).await;
            let existing = self.store.get_summary(owner, &partner.partner_id).await?;

            match merge_feed(existing.as_ref(), owner, partner, profile.as_ref(), Utc::now()) {
                Some(merged) => {
                    self.store.put_summary(&merged).await?;
                    report.rows_written += 1;
                    tracing::debug!(owner, partner = %partner.partner_id, unread = merged.unread_count, "Summary row refreshed");
                }
                None => {
                    tracing::debug!(owner, partner = %partner.partner_id, "Summary row unchanged");
                }
            }
        }

        tracing::info!(
            owner,
            partners = report.partners_scanned,
            written = report.rows_written,
            "Synchronization pass complete"
        );
        Ok(report)
    }

    /// A directory failure must not fail the pass: the partner is treated as
    /// unknown and the stored profile fields are kept.
    async fn profile_for(&self, partner: &str) -> Option<PartnerProfile> {
        let profiles = self.profiles.as_ref()?;
        match profiles.lookup(partner).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(partner, "Profile lookup failed: {}", e);
                None
            }
        }
    }
}
