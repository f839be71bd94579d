use std::time::Duration;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::doc,
    options::{ClientOptions, FindOptions, IndexOptions, ReplaceOptions},
};

use crate::domain::{Stats, Subscriber};
use crate::storage::{StatsStore, StorageError, SubscriberStore};

const SUBSCRIBERS_COLLECTION: &str = "subscribers";
const STATS_COLLECTION: &str = "stats";

// Server-side code for a unique index violation.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Connects and verifies the server is reachable before the application
/// starts accepting requests.
pub async fn connect(uri: &str, database: &str) -> Result<Database, StorageError> {
    let mut options = ClientOptions::parse(uri).await?;
    options.connect_timeout = Some(Duration::from_secs(10));
    options.server_selection_timeout = Some(Duration::from_secs(5));

    let client = Client::with_options(options)?;
    client.list_database_names().await?;

    Ok(client.database(database))
}

pub struct MongoSubscriberStore {
    collection: Collection<Subscriber>,
}

impl MongoSubscriberStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Subscriber>(SUBSCRIBERS_COLLECTION),
        }
    }

    /// Uniqueness of the email key is enforced by the database itself.
    pub async fn ensure_indexes(&self) -> Result<(), StorageError> {
        let model = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(model).await?;
        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(we)) => {
            we.code == DUPLICATE_KEY_CODE
        }
        _ => false,
    }
}

#[async_trait]
impl SubscriberStore for MongoSubscriberStore {
    async fn find(&self, email: &str) -> Result<Option<Subscriber>, StorageError> {
        let subscriber = self.collection.find_one(doc! { "email": email }).await?;
        Ok(subscriber)
    }

    #[tracing::instrument(name = "Inserting new subscriber document", skip(self))]
    async fn create(&self, email: &str) -> Result<Subscriber, StorageError> {
        let subscriber = Subscriber::new(email.to_owned());
        self.collection
            .insert_one(&subscriber)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    StorageError::Duplicate(email.to_owned())
                } else {
                    e.into()
                }
            })?;

        Ok(subscriber)
    }

    async fn list_all(&self) -> Result<Vec<Subscriber>, StorageError> {
        let options = FindOptions::builder()
            .sort(doc! { "subscribedAt": -1 })
            .build();
        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        let subscribers = cursor.try_collect().await?;
        Ok(subscribers)
    }

    async fn count(&self, verified: Option<bool>) -> Result<u64, StorageError> {
        let filter = match verified {
            Some(v) => doc! { "verified": v },
            None => doc! {},
        };
        let count = self.collection.count_documents(filter).await?;
        Ok(count)
    }

    #[tracing::instrument(name = "Deleting subscriber document", skip(self))]
    async fn delete(&self, email: &str) -> Result<bool, StorageError> {
        let result = self.collection.delete_one(doc! { "email": email }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn mark_verified(&self, email: &str) -> Result<bool, StorageError> {
        let result = self
            .collection
            .update_one(
                doc! { "email": email },
                doc! { "$set": { "verified": true } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }
}

/// The aggregate is a single document; load takes whatever is there and save
/// upserts it back.
pub struct MongoStatsStore {
    collection: Collection<Stats>,
}

impl MongoStatsStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Stats>(STATS_COLLECTION),
        }
    }
}

#[async_trait]
impl StatsStore for MongoStatsStore {
    async fn load(&self) -> Result<Stats, StorageError> {
        let stats = self.collection.find_one(doc! {}).await?;
        Ok(stats.unwrap_or_default())
    }

    async fn save(&self, stats: &Stats) -> Result<(), StorageError> {
        let options = ReplaceOptions::builder().upsert(true).build();
        self.collection
            .replace_one(doc! {}, stats)
            .with_options(options)
            .await?;
        Ok(())
    }
}
