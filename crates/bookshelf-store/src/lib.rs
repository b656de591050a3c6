//! bookshelf-store: collection gateway for the Bookshelf API
//!
//! This crate provides:
//! - The [`Gateway`] trait the router calls for find/insert/update/delete
//! - [`MongoGateway`], backed by a long-lived MongoDB client
//! - [`MemoryGateway`], an in-process store for tests and local runs
//! - [`DisconnectedGateway`], used when the startup handshake never succeeded
//! - Bounded retry with backoff for the initial connection
//!
//! # Usage
//!
//! ```rust,ignore
//! use bookshelf_store::{Gateway, MongoGateway, StoreConfig};
//!
//! let config = StoreConfig {
//!     uri: "mongodb://localhost:27017".to_string(),
//!     ..StoreConfig::default()
//! };
//! let gateway = MongoGateway::connect_with_retry(&config).await?;
//!
//! let books = gateway.find("books", 0, Some(10)).await?;
//! ```

pub mod error;
pub mod gateway;
pub mod memory;
pub mod retry;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use gateway::{
    DeleteOutcome, DisconnectedGateway, Gateway, InsertOutcome, StoreHealth, UpdateOutcome,
};
pub use memory::MemoryGateway;
pub use retry::RetryPolicy;
pub use store::{DEFAULT_DATABASE, MongoGateway, StoreConfig};

// Re-export for downstream crates building documents and filters.
pub use bson;
