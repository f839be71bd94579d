mod file;
mod mongo;

pub use file::{FileStatsStore, FileSubscriberStore};
pub use mongo::{MongoStatsStore, MongoSubscriberStore, connect};

use async_trait::async_trait;

use crate::domain::{Stats, Subscriber};

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("a subscriber with email {0} already exists")]
    Duplicate(String),
    #[error("failed to read or write the data file")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize persisted state")]
    Serialization(#[from] serde_json::Error),
    #[error("database operation failed")]
    Database(#[from] mongodb::error::Error),
}

/// Uniform contract over subscriber persistence. The backend is picked once
/// at startup; business logic only ever sees this trait.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Exact string match on the email address.
    async fn find(&self, email: &str) -> Result<Option<Subscriber>, StorageError>;

    /// Inserts a fresh unverified record. Returns [`StorageError::Duplicate`]
    /// when the address is already registered; callers that want idempotent
    /// subscribe semantics should `find` first.
    async fn create(&self, email: &str) -> Result<Subscriber, StorageError>;

    /// All subscribers, most recently subscribed first.
    async fn list_all(&self) -> Result<Vec<Subscriber>, StorageError>;

    /// Number of subscribers, optionally narrowed to a verified state.
    async fn count(&self, verified: Option<bool>) -> Result<u64, StorageError>;

    /// Removes a record. `false` when no record matched.
    async fn delete(&self, email: &str) -> Result<bool, StorageError>;

    /// Flips the verified flag. `false` when no record matched.
    async fn mark_verified(&self, email: &str) -> Result<bool, StorageError>;
}

/// Persistence for the singleton stats aggregate.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Loads the aggregate, falling back to a zeroed one when none exists yet.
    async fn load(&self) -> Result<Stats, StorageError>;

    async fn save(&self, stats: &Stats) -> Result<(), StorageError>;
}
