//! The collection gateway contract.
//!
//! A gateway turns (collection, operation, filter/payload) into a store call
//! and hands back the store's native answer. It never applies business
//! rules: identifier parsing, payload validation and status mapping all
//! happen in the router.

use async_trait::async_trait;
use bson::{Document, oid::ObjectId};
use serde::Serialize;

use crate::error::StoreResult;

/// Acknowledgment of an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub acknowledged: bool,
    #[serde(serialize_with = "bson::serde_helpers::serialize_object_id_as_hex_string")]
    pub inserted_id: ObjectId,
}

/// Acknowledgment of a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Acknowledgment of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

/// Connection state as seen by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreHealth {
    /// The startup handshake never succeeded.
    NeverConnected,
    /// The last store call succeeded.
    Connected,
    /// Connected once, but the last store call failed.
    Unavailable,
}

impl StoreHealth {
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}

/// Operations the router issues against a named collection.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Documents ordered by `_id`, skipping `skip` and returning at most
    /// `limit` (all when `None`).
    async fn find(
        &self,
        collection: &str,
        skip: u64,
        limit: Option<u64>,
    ) -> StoreResult<Vec<Document>>;

    /// Number of documents in the collection.
    async fn count(&self, collection: &str) -> StoreResult<u64>;

    async fn find_one(&self, collection: &str, id: ObjectId) -> StoreResult<Option<Document>>;

    /// Insert a document without an `_id`; the store assigns one.
    async fn insert_one(&self, collection: &str, document: Document) -> StoreResult<InsertOutcome>;

    /// Merge `fields` into the document with the given id (`$set`).
    ///
    /// The document only matches while every field in `expected` still holds
    /// that value; a `Null` expectation matches a missing field. Pass an empty
    /// document for an unconditional update.
    async fn update_one(
        &self,
        collection: &str,
        id: ObjectId,
        expected: Document,
        fields: Document,
    ) -> StoreResult<UpdateOutcome>;

    async fn delete_one(&self, collection: &str, id: ObjectId) -> StoreResult<DeleteOutcome>;

    fn health(&self) -> StoreHealth;

    /// Release the connection. Called once when the server stops.
    async fn shutdown(&self) {}
}

/// Gateway used when the startup connection attempts were exhausted.
///
/// Every data operation fails with [`StoreError::NotConnected`] so the
/// router can tell "never connected" apart from a transient failure.
///
/// [`StoreError::NotConnected`]: crate::StoreError::NotConnected
#[derive(Debug, Clone)]
pub struct DisconnectedGateway {
    reason: String,
}

impl DisconnectedGateway {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> StoreResult<T> {
        Err(crate::StoreError::NotConnected(self.reason.clone()))
    }
}

#[async_trait]
impl Gateway for DisconnectedGateway {
    async fn find(&self, _: &str, _: u64, _: Option<u64>) -> StoreResult<Vec<Document>> {
        self.fail()
    }

    async fn count(&self, _: &str) -> StoreResult<u64> {
        self.fail()
    }

    async fn find_one(&self, _: &str, _: ObjectId) -> StoreResult<Option<Document>> {
        self.fail()
    }

    async fn insert_one(&self, _: &str, _: Document) -> StoreResult<InsertOutcome> {
        self.fail()
    }

    async fn update_one(
        &self,
        _: &str,
        _: ObjectId,
        _: Document,
        _: Document,
    ) -> StoreResult<UpdateOutcome> {
        self.fail()
    }

    async fn delete_one(&self, _: &str, _: ObjectId) -> StoreResult<DeleteOutcome> {
        self.fail()
    }

    fn health(&self) -> StoreHealth {
        StoreHealth::NeverConnected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;

    #[tokio::test]
    async fn test_disconnected_gateway_fails_every_operation() {
        let gateway = DisconnectedGateway::new("connection refused");
        assert_eq!(gateway.health(), StoreHealth::NeverConnected);

        let err = gateway.find("books", 0, None).await.unwrap_err();
        assert!(matches!(err, StoreError::NotConnected(ref r) if r == "connection refused"));
        assert!(gateway.count("books").await.is_err());
        assert!(gateway.find_one("books", ObjectId::new()).await.is_err());
        assert!(gateway.delete_one("books", ObjectId::new()).await.is_err());
    }

    #[test]
    fn test_health_serializes_snake_case() {
        let json = serde_json::to_string(&StoreHealth::NeverConnected).unwrap();
        assert_eq!(json, "\"never_connected\"");
    }

    #[test]
    fn test_insert_outcome_serializes_hex_id() {
        let id = ObjectId::new();
        let outcome = InsertOutcome {
            acknowledged: true,
            inserted_id: id,
        };
        let json = serde_json::to_value(outcome).unwrap();
        assert_eq!(json["insertedId"], id.to_hex());
        assert_eq!(json["acknowledged"], true);
    }
}
