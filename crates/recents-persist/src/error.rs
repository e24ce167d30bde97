use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Message feed unavailable: {0}")]
    FeedUnavailable(String),

    #[error("Summary store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Batch write failed: {0}")]
    BatchWriteFailed(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[cfg(feature = "mongodb")]
    #[error("BSON serialization error: {0}")]
    BsonSerialization(#[from] bson::ser::Error),

    #[cfg(feature = "mongodb")]
    #[error("BSON deserialization error: {0}")]
    BsonDeserialization(#[from] bson::de::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PersistError {
    /// Whether the caller sent something unusable, as opposed to a backend fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PersistError::Validation(_) | PersistError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, PersistError>;
