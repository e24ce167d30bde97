use recents_persist::{PersistError, Result, SummaryStore};
use recents_types::{BatchEntry, SummaryUpdate};
use std::sync::Arc;

use crate::normalize_id;

/// Result of one batch push.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub submitted: usize,
    pub applied: usize,
    pub skipped: usize,
}

/// Applies client-pushed summary deltas in a single all-or-nothing write.
pub struct BatchUpsertWriter {
    store: Arc<dyn SummaryStore>,
}

impl BatchUpsertWriter {
    pub fn new(store: Arc<dyn SummaryStore>) -> Self {
        Self { store }
    }

    pub async fn batch_upsert(&self, entries: Vec<BatchEntry>) -> Result<BatchOutcome> {
        if entries.is_empty() {
            return Err(PersistError::Validation("updates must not be empty".to_string()));
        }

        let submitted = entries.len();
        let updates: Vec<SummaryUpdate> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match validate_entry(entry) {
                Ok(update) => Some(update),
                Err(reason) => {
                    tracing::warn!(index, "Skipping malformed batch entry: {}", reason);
                    None
                }
            })
            .collect();

        let applied = if updates.is_empty() {
            0
        } else {
            self.store.apply_batch(&updates).await.map_err(|e| match e {
                PersistError::BatchWriteFailed(_) => e,
                other => PersistError::BatchWriteFailed(other.to_string()),
            })?
        };

        let outcome = BatchOutcome {
            submitted,
            applied,
            skipped: submitted - updates.len(),
        };
        tracing::info!(
            submitted = outcome.submitted,
            applied = outcome.applied,
            skipped = outcome.skipped,
            "Batch upsert applied"
        );
        Ok(outcome)
    }
}

fn validate_entry(entry: BatchEntry) -> std::result::Result<SummaryUpdate, String> {
    let owner = entry.owner_id.ok_or("missing owner")?;
    let mut delta = entry.delta.ok_or("missing summary delta")?;
    let partner = delta.partner_id.as_deref().ok_or("missing partner id")?;

    let owner_id = normalize_id(&owner, "ownerId").map_err(|e| e.to_string())?;
    let partner_id = normalize_id(partner, "partnerId").map_err(|e| e.to_string())?;
    delta.partner_id = Some(partner_id.clone());

    Ok(SummaryUpdate {
        owner_id,
        partner_id,
        delta,
    })
}

/// Distinct owners touched by a batch, in first-seen order.
pub(crate) fn affected_owners(entries: &[BatchEntry]) -> Vec<String> {
    let mut owners: Vec<String> = Vec::new();
    for owner in entries.iter().filter_map(|entry| entry.owner_id.as_deref()) {
        let owner = owner.trim();
        if !owner.is_empty() && !owners.iter().any(|seen| seen == owner) {
            owners.push(owner.to_string());
        }
    }
    owners
}

#[cfg(test)]
mod tests {
    use super::*;
    use recents_types::SummaryDelta;

    fn delta(partner: Option<&str>) -> SummaryDelta {
        SummaryDelta {
            partner_id: partner.map(str::to_string),
            ..SummaryDelta::default()
        }
    }

    #[test]
    fn test_validate_entry_trims_ids() {
        let update = validate_entry(BatchEntry::new(" bob ", delta(Some("alice ")))).unwrap();
        assert_eq!(update.owner_id, "bob");
        assert_eq!(update.partner_id, "alice");
        assert_eq!(update.delta.partner_id.as_deref(), Some("alice"));
    }

    #[test]
    fn test_validate_entry_rejects_malformed() {
        assert!(validate_entry(BatchEntry::default()).is_err());
        assert!(validate_entry(BatchEntry::new("bob", delta(None))).is_err());
        assert!(validate_entry(BatchEntry::new("  ", delta(Some("alice")))).is_err());
        assert!(validate_entry(BatchEntry {
            owner_id: Some("bob".to_string()),
            delta: None,
        })
        .is_err());
    }

    #[test]
    fn test_affected_owners_dedupes() {
        let entries = vec![
            BatchEntry::new("bob", delta(Some("alice"))),
            BatchEntry::new(" bob", delta(Some("carol"))),
            BatchEntry::new("carol", delta(Some("bob"))),
            BatchEntry::default(),
        ];
        assert_eq!(affected_owners(&entries), vec!["bob", "carol"]);
    }
}
