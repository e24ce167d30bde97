mod batch;
mod service;
mod synchronizer;
mod unread;

pub use batch::{BatchOutcome, BatchUpsertWriter};
pub use service::{RecentsService, RecentsServiceBuilder};
pub use synchronizer::{SyncReport, Synchronizer};
pub use unread::UnreadLifecycle;

pub use recents_persist::{PersistError, Result};

/// Trim an identity and reject it when nothing is left.
pub fn normalize_id(raw: &str, field: &str) -> Result<String> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(PersistError::Validation(format!("{} is required", field)));
    }
    Ok(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id("  bob ", "userId").unwrap(), "bob");
        assert!(matches!(
            normalize_id("   ", "userId"),
            Err(PersistError::Validation(msg)) if msg == "userId is required"
        ));
    }
}
