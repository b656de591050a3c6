//! Tower middleware for the HTTP stack.

pub mod request_id;
