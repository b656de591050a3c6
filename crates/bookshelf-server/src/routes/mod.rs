//! Route definitions for the HTTP API.

pub mod books;
pub mod health;
pub mod records;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the complete router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(users::routes())
        .merge(books::routes())
        .with_state(state)
}
