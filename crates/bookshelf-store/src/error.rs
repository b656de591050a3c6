//! Error types for the storage layer.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The driver reported a failure (network, server, write error).
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// The initial connection never succeeded.
    #[error("store not connected: {0}")]
    NotConnected(String),

    /// A value could not be encoded as BSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    /// A stored document did not decode into the expected record.
    #[error("deserialization error: {0}")]
    Deserialization(#[from] bson::de::Error),

    /// The store answered with something the gateway cannot interpret.
    #[error("unexpected store response: {0}")]
    UnexpectedResponse(String),
}
