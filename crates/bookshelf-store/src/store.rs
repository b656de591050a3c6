//! MongoDB gateway.
//!
//! The `MongoGateway` holds one long-lived client for the whole process.
//! It is built once at startup by [`MongoGateway::connect_with_retry`] and
//! shared read-only by every request.

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bson::{Document, doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};

use crate::error::{StoreError, StoreResult};
use crate::gateway::{DeleteOutcome, Gateway, InsertOutcome, StoreHealth, UpdateOutcome};
use crate::retry::RetryPolicy;

/// Database used when the connection string does not name one.
pub const DEFAULT_DATABASE: &str = "bookshelf";

/// Configuration for connecting to the document store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// MongoDB connection string.
    pub uri: String,
    /// Database name when the URI carries no default database.
    pub database: String,
    /// How long the driver looks for a usable server before failing a call.
    pub server_selection_timeout: Duration,
    /// Retry policy for the startup handshake.
    pub retry: RetryPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: DEFAULT_DATABASE.to_string(),
            server_selection_timeout: Duration::from_secs(5),
            retry: RetryPolicy::default(),
        }
    }
}

/// Connection health as last observed by driver calls.
///
/// Any successful call marks the store connected; only a connectivity
/// failure marks it unavailable. Other errors leave it unchanged.
#[derive(Debug)]
struct HealthTracker(AtomicU8);

impl HealthTracker {
    const CONNECTED: u8 = 0;
    const UNAVAILABLE: u8 = 1;

    fn new() -> Self {
        Self(AtomicU8::new(Self::CONNECTED))
    }

    fn record_success(&self) {
        self.0.store(Self::CONNECTED, Ordering::Relaxed);
    }

    fn record_failure(&self, connectivity_lost: bool) {
        if connectivity_lost {
            self.0.store(Self::UNAVAILABLE, Ordering::Relaxed);
        }
    }

    fn get(&self) -> StoreHealth {
        match self.0.load(Ordering::Relaxed) {
            Self::CONNECTED => StoreHealth::Connected,
            _ => StoreHealth::Unavailable,
        }
    }
}

/// Gateway backed by a MongoDB database.
#[derive(Debug)]
pub struct MongoGateway {
    client: Client,
    database: Database,
    health: HealthTracker,
}

impl MongoGateway {
    /// Build the client and perform a `ping` handshake. One attempt.
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        options.app_name = Some("bookshelf".to_string());
        options.server_selection_timeout = Some(config.server_selection_timeout);

        let client = Client::with_options(options)?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(&config.database));

        database.run_command(doc! { "ping": 1 }).await?;

        tracing::info!(database = %database.name(), "Connected to document store");

        Ok(Self {
            client,
            database,
            health: HealthTracker::new(),
        })
    }

    /// [`connect`](Self::connect) under the configured retry policy.
    pub async fn connect_with_retry(config: &StoreConfig) -> StoreResult<Self> {
        config
            .retry
            .run("Store connection", |attempt| {
                tracing::info!(attempt, "Connecting to document store...");
                Self::connect(config)
            })
            .await
    }

    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.database.collection::<Document>(name)
    }

    /// Track connection health from the outcome of a driver call.
    fn observe<T>(&self, result: mongodb::error::Result<T>) -> StoreResult<T> {
        match result {
            Ok(value) => {
                self.health.record_success();
                Ok(value)
            }
            Err(e) => {
                self.health.record_failure(is_connectivity_error(&e));
                Err(StoreError::Database(e))
            }
        }
    }
}

fn is_connectivity_error(error: &mongodb::error::Error) -> bool {
    matches!(
        *error.kind,
        ErrorKind::Io(_) | ErrorKind::ServerSelection { .. } | ErrorKind::ConnectionPoolCleared { .. }
    )
}

fn by_id(id: ObjectId) -> Document {
    doc! { "_id": id }
}

/// `by_id` narrowed to documents that still hold the `expected` values.
fn guarded(id: ObjectId, expected: Document) -> Document {
    let mut filter = by_id(id);
    for (key, value) in expected {
        filter.insert(key, value);
    }
    filter
}

#[async_trait]
impl Gateway for MongoGateway {
    async fn find(
        &self,
        collection: &str,
        skip: u64,
        limit: Option<u64>,
    ) -> StoreResult<Vec<Document>> {
        let collection = self.collection(collection);
        let mut query = collection
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .skip(skip);
        if let Some(limit) = limit {
            let limit = i64::try_from(limit)
                .map_err(|_| StoreError::UnexpectedResponse(format!("limit {limit} too large")))?;
            query = query.limit(limit);
        }

        let cursor = self.observe(query.await)?;
        self.observe(cursor.try_collect().await)
    }

    async fn count(&self, collection: &str) -> StoreResult<u64> {
        self.observe(self.collection(collection).count_documents(doc! {}).await)
    }

    async fn find_one(&self, collection: &str, id: ObjectId) -> StoreResult<Option<Document>> {
        self.observe(self.collection(collection).find_one(by_id(id)).await)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> StoreResult<InsertOutcome> {
        let result = self.observe(self.collection(collection).insert_one(document).await)?;
        let inserted_id = result.inserted_id.as_object_id().ok_or_else(|| {
            StoreError::UnexpectedResponse(format!(
                "inserted id is not an ObjectId: {}",
                result.inserted_id
            ))
        })?;

        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id,
        })
    }

    async fn update_one(
        &self,
        collection: &str,
        id: ObjectId,
        expected: Document,
        fields: Document,
    ) -> StoreResult<UpdateOutcome> {
        let result = self.observe(
            self.collection(collection)
                .update_one(guarded(id, expected), doc! { "$set": fields })
                .await,
        )?;

        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn delete_one(&self, collection: &str, id: ObjectId) -> StoreResult<DeleteOutcome> {
        let result = self.observe(self.collection(collection).delete_one(by_id(id)).await)?;

        Ok(DeleteOutcome {
            deleted_count: result.deleted_count,
        })
    }

    fn health(&self) -> StoreHealth {
        self.health.get()
    }

    async fn shutdown(&self) {
        tracing::info!("Closing document store connection");
        self.client.clone().shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::Bson;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.database, DEFAULT_DATABASE);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.server_selection_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_by_id_filter() {
        let id = ObjectId::new();
        assert_eq!(by_id(id).get_object_id("_id").unwrap(), id);
    }

    #[test]
    fn test_guarded_filter_keeps_id() {
        let id = ObjectId::new();
        let filter = guarded(id, doc! { "totalCopies": 3_i64, "availableCopies": Bson::Null });
        assert_eq!(filter.get_object_id("_id").unwrap(), id);
        assert_eq!(filter.get_i64("totalCopies").unwrap(), 3);
        assert_eq!(filter.get("availableCopies"), Some(&Bson::Null));
        assert_eq!(guarded(id, doc! {}), by_id(id));
    }

    #[test]
    fn test_health_flips_with_connectivity() {
        let health = HealthTracker::new();
        assert_eq!(health.get(), StoreHealth::Connected);

        health.record_failure(true);
        assert_eq!(health.get(), StoreHealth::Unavailable);

        health.record_success();
        assert_eq!(health.get(), StoreHealth::Connected);
    }

    #[test]
    fn test_health_ignores_other_failures() {
        let health = HealthTracker::new();
        health.record_failure(false);
        assert_eq!(health.get(), StoreHealth::Connected);

        health.record_failure(true);
        health.record_failure(false);
        assert_eq!(health.get(), StoreHealth::Unavailable);
    }

    #[test]
    fn test_io_error_counts_as_connectivity() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(is_connectivity_error(&mongodb::error::Error::from(io)));
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_uri() {
        let config = StoreConfig {
            uri: "not-a-mongodb-uri".to_string(),
            ..StoreConfig::default()
        };
        let err = MongoGateway::connect(&config).await.unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }
}
