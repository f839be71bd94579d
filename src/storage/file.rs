use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Stats, Subscriber};
use crate::storage::{StatsStore, StorageError, SubscriberStore};

const SUBSCRIBERS_FILE: &str = "subscribers.json";
const STATS_FILE: &str = "stats.json";

/// Flat-file backend: the full subscriber list lives in memory and every
/// mutation rewrites `subscribers.json` before the call returns. There is no
/// write-ahead log; a crash mid-write can corrupt the file.
pub struct FileSubscriberStore {
    path: PathBuf,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl FileSubscriberStore {
    pub async fn load(data_dir: &Path) -> Result<Self, StorageError> {
        tokio::fs::create_dir_all(data_dir).await?;
        let path = data_dir.join(SUBSCRIBERS_FILE);
        let subscribers = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            subscribers: Mutex::new(subscribers),
        })
    }

    async fn persist(&self, subscribers: &[Subscriber]) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(subscribers)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl SubscriberStore for FileSubscriberStore {
    async fn find(&self, email: &str) -> Result<Option<Subscriber>, StorageError> {
        let subscribers = self.subscribers.lock().await;
        Ok(subscribers.iter().find(|s| s.email == email).cloned())
    }

    #[tracing::instrument(name = "Saving new subscriber to the data file", skip(self))]
    async fn create(&self, email: &str) -> Result<Subscriber, StorageError> {
        let mut subscribers = self.subscribers.lock().await;
        if subscribers.iter().any(|s| s.email == email) {
            return Err(StorageError::Duplicate(email.to_owned()));
        }

        let subscriber = Subscriber::new(email.to_owned());
        subscribers.push(subscriber.clone());
        self.persist(&subscribers).await?;

        Ok(subscriber)
    }

    async fn list_all(&self) -> Result<Vec<Subscriber>, StorageError> {
        let subscribers = self.subscribers.lock().await;
        // Insertion order reversed: most recently subscribed first.
        Ok(subscribers.iter().rev().cloned().collect())
    }

    async fn count(&self, verified: Option<bool>) -> Result<u64, StorageError> {
        let subscribers = self.subscribers.lock().await;
        let count = subscribers
            .iter()
            .filter(|s| verified.is_none_or(|v| s.verified == v))
            .count();
        Ok(count as u64)
    }

    #[tracing::instrument(name = "Deleting subscriber from the data file", skip(self))]
    async fn delete(&self, email: &str) -> Result<bool, StorageError> {
        let mut subscribers = self.subscribers.lock().await;
        let before = subscribers.len();
        subscribers.retain(|s| s.email != email);
        if subscribers.len() == before {
            return Ok(false);
        }

        self.persist(&subscribers).await?;
        Ok(true)
    }

    async fn mark_verified(&self, email: &str) -> Result<bool, StorageError> {
        let mut subscribers = self.subscribers.lock().await;
        let Some(subscriber) = subscribers.iter_mut().find(|s| s.email == email) else {
            return Ok(false);
        };
        subscriber.verified = true;

        self.persist(&subscribers).await?;
        Ok(true)
    }
}

pub struct FileStatsStore {
    path: PathBuf,
}

impl FileStatsStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(STATS_FILE),
        }
    }
}

#[async_trait]
impl StatsStore for FileStatsStore {
    async fn load(&self) -> Result<Stats, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Stats::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, stats: &Stats) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(stats)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}
