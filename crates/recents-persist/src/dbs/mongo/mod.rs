mod client;
mod feed;
mod models;
mod profiles;
mod store;

pub use client::{MongoBackend, MongoSettings};
pub use feed::MongoMessageFeed;
pub use profiles::MongoProfileDirectory;
pub use store::MongoSummaryStore;

use crate::error::PersistError;

pub(crate) const SUMMARY_COLLECTION: &str = "recent_chats";
pub(crate) const MESSAGE_COLLECTION: &str = "messages";
pub(crate) const USER_COLLECTION: &str = "users";

pub(crate) fn store_unavailable(err: mongodb::error::Error) -> PersistError {
    PersistError::StoreUnavailable(err.to_string())
}

pub(crate) fn feed_unavailable(err: mongodb::error::Error) -> PersistError {
    PersistError::FeedUnavailable(err.to_string())
}
