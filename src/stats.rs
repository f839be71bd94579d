use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::Stats;
use crate::storage::{StatsStore, StorageError};

/// Owns the singleton aggregate for the process lifetime: loaded once at
/// startup, mutated in place, persisted after every mutation. Save failures
/// are logged and the in-memory mutation stands; the inconsistency window is
/// accepted.
pub struct StatsKeeper {
    stats: Mutex<Stats>,
    store: Arc<dyn StatsStore>,
}

impl StatsKeeper {
    pub async fn load(store: Arc<dyn StatsStore>) -> Result<Self, StorageError> {
        let stats = store.load().await?;
        Ok(Self {
            stats: Mutex::new(stats),
            store,
        })
    }

    pub async fn record_click(&self) {
        let mut stats = self.stats.lock().await;
        stats.record_click();
        self.persist(&stats).await;
    }

    pub async fn record_registration(&self) {
        let mut stats = self.stats.lock().await;
        stats.record_registration();
        self.persist(&stats).await;
    }

    pub async fn record_removal(&self) {
        let mut stats = self.stats.lock().await;
        stats.record_removal();
        self.persist(&stats).await;
    }

    pub async fn snapshot(&self) -> Stats {
        self.stats.lock().await.clone()
    }

    async fn persist(&self, stats: &Stats) {
        if let Err(e) = self.store.save(stats).await {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to persist the stats aggregate"
            );
        }
    }
}
