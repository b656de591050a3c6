//! bookshelf-core: record types for the Bookshelf API
//!
//! This crate provides:
//! - Typed `Book` and `User` records as stored in the document store
//! - Create payloads and partial-update patches with validation
//! - Page arithmetic for list endpoints
//! - Password hashing for user records
//!
//! Nothing here talks to the store or to HTTP; the gateway and the router
//! build on these types.

pub mod book;
pub mod pagination;
pub mod password;
pub mod types;
pub mod user;
pub mod validation;

pub use book::{Book, BookPatch, NewBook};
pub use pagination::{DEFAULT_LIMIT, DEFAULT_PAGE, Page, PageRequest};
pub use password::{PasswordError, hash_password};
pub use types::{Resource, parse_record_id};
pub use user::{NewUser, User, UserPatch};
pub use validation::{ValidationError, ValidationResult};

// Re-export for downstream crates handling store keys and documents.
pub use bson;
