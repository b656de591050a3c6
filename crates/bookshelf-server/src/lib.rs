//! bookshelf-server: HTTP API server for the Bookshelf collections
//!
//! This crate provides:
//! - REST endpoints for users and books (list, get, create, partial update, delete)
//! - Identifier, query and payload validation ahead of any store call
//! - One central mapping from errors to HTTP statuses
//! - Liveness and store-health endpoints
//!
//! # Architecture
//!
//! The server is built on Axum. The collection gateway is constructed once
//! at startup and injected through [`AppState`]; the middleware stack adds:
//! - Request IDs on requests, responses and tracing spans
//! - Request tracing and logging
//! - CORS handling
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bookshelf_server::{AppState, ServerConfig, build_app};
//! use bookshelf_store::MemoryGateway;
//!
//! let state = AppState::new(Arc::new(MemoryGateway::new()), ServerConfig::default());
//! let app = build_app(state)?;
//! axum::serve(listener, app).await?;
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-exports for convenience
pub use app::build_app;
pub use config::{ConfigError, LogFormat, ServerConfig, StoreBackend};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

// Re-export dependent crates
pub use bookshelf_core;
pub use bookshelf_store;
