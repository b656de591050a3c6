//! In-process gateway.
//!
//! Keeps each collection as a vector of documents in insertion order, which
//! matches `_id` order for ids generated here. Used by the router tests and
//! by the `memory` store backend for local runs without MongoDB.

use std::collections::HashMap;

use async_trait::async_trait;
use bson::{Bson, Document, doc, oid::ObjectId};
use tokio::sync::RwLock;

use crate::error::StoreResult;
use crate::gateway::{DeleteOutcome, Gateway, InsertOutcome, StoreHealth, UpdateOutcome};

#[derive(Debug, Default)]
pub struct MemoryGateway {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

fn has_id(document: &Document, id: ObjectId) -> bool {
    document.get_object_id("_id").is_ok_and(|found| found == id)
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

/// Equality as a MongoDB filter sees it: `null` matches a missing field and
/// numbers compare by value across BSON types.
fn field_matches(stored: Option<&Bson>, expected: &Bson) -> bool {
    match (stored, expected) {
        (None | Some(Bson::Null), Bson::Null) => true,
        (Some(stored), expected) => match (as_number(stored), as_number(expected)) {
            (Some(a), Some(b)) => a == b,
            _ => stored == expected,
        },
        (None, _) => false,
    }
}

fn matches_expected(document: &Document, expected: &Document) -> bool {
    expected
        .iter()
        .all(|(key, value)| field_matches(document.get(key), value))
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn find(
        &self,
        collection: &str,
        skip: u64,
        limit: Option<u64>,
    ) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        Ok(documents.iter().skip(skip).take(limit).cloned().collect())
    }

    async fn count(&self, collection: &str) -> StoreResult<u64> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map_or(0, |documents| documents.len() as u64))
    }

    async fn find_one(&self, collection: &str, id: ObjectId) -> StoreResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.iter().find(|d| has_id(d, id)))
            .cloned())
    }

    async fn insert_one(&self, collection: &str, document: Document) -> StoreResult<InsertOutcome> {
        let inserted_id = ObjectId::new();

        let mut stored = doc! { "_id": inserted_id };
        for (key, value) in document {
            if key != "_id" {
                stored.insert(key, value);
            }
        }

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(stored);

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
        let mut collections = self.collections.write().await;
        let Some(document) = collections.get_mut(collection).and_then(|documents| {
            documents
                .iter_mut()
                .find(|d| has_id(d, id) && matches_expected(d, &expected))
        }) else {
            return Ok(UpdateOutcome {
                matched_count: 0,
                modified_count: 0,
            });
        };

        let mut modified = false;
        for (key, value) in fields {
            if document.get(&key) != Some(&value) {
                modified = true;
                document.insert(key, value);
            }
        }

        Ok(UpdateOutcome {
            matched_count: 1,
            modified_count: u64::from(modified),
        })
    }

    async fn delete_one(&self, collection: &str, id: ObjectId) -> StoreResult<DeleteOutcome> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(DeleteOutcome { deleted_count: 0 });
        };

        let before = documents.len();
        documents.retain(|d| !has_id(d, id));

        Ok(DeleteOutcome {
            deleted_count: (before - documents.len()) as u64,
        })
    }

    fn health(&self) -> StoreHealth {
        StoreHealth::Connected
    }
}
