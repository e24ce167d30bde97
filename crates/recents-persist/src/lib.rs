pub mod cache;
pub mod dbs;
pub mod error;
pub mod trait_client;

pub use cache::{cache_key, CacheStats, InMemorySummaryCache, SummaryCache};
pub use dbs::memory::{MemoryMessageFeed, MemoryProfileDirectory, MemorySummaryStore};
#[cfg(feature = "mongodb")]
pub use dbs::mongo::{MongoBackend, MongoMessageFeed, MongoProfileDirectory, MongoSettings, MongoSummaryStore};
pub use error::{PersistError, Result};
pub use trait_client::{MessageFeed, ProfileDirectory, SummaryStore};
