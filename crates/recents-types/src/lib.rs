pub mod config;
pub mod merge;
pub mod message;
pub mod summary;
pub mod view;

pub use config::{ClearUnreadStrategy, SyncConfig};
pub use merge::{merge_feed, merge_push};
pub use message::{Message, PartnerActivity};
pub use summary::{
    BatchEntry, ConversationSummary, PartnerProfile, SummaryDelta, SummaryUpdate,
    PLACEHOLDER_LAST_MESSAGE,
};
pub use view::RecentChat;
