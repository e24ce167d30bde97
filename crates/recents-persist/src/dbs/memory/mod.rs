//! In-process backends. Used by tests and by the `memory` storage backend of
//! the API server.

mod feed;
mod profiles;
mod store;

pub use feed::MemoryMessageFeed;
pub use profiles::MemoryProfileDirectory;
pub use store::MemorySummaryStore;
