//! Liveness and health endpoints.

use axum::{Json, Router, extract::State, routing::get};
use bookshelf_store::StoreHealth;
use serde::Serialize;

use crate::state::AppState;

/// Body of the liveness route.
pub const LIVENESS_TEXT: &str = "Bookshelf API is running";

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when the store is connected, `degraded` otherwise.
    pub status: &'static str,
    /// Store connection state.
    pub store: StoreHealth,
}

impl HealthResponse {
    fn from_store(store: StoreHealth) -> Self {
        Self {
            status: if store.is_connected() { "ok" } else { "degraded" },
            store,
        }
    }
}

/// GET / - Liveness text.
async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

/// GET /health - Process and store health.
///
/// Always 200 so the process stays up while the store is away; the body
/// tells "never connected" apart from "transiently unavailable".
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::from_store(state.gateway().health()))
}

/// Build health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(liveness))
        .route("/health", get(health_check))
}
