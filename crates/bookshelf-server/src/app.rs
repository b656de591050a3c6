//! Assembly of the router and its middleware stack.

use axum::{Router, body::Body, middleware};
use http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{ConfigError, ServerConfig};
use crate::middleware::request_id::{make_request_span, propagate_request_id, request_id_layer};
use crate::routes;
use crate::state::AppState;

/// Build the application: routes plus request id, tracing and CORS layers.
///
/// Layers run outermost first: the request id is assigned before the trace
/// span opens, so the span can record it.
pub fn build_app(state: AppState) -> Result<Router, ConfigError> {
    let cors = build_cors_layer(&state.config().cors_allowed_origins)?;

    Ok(routes::build_router(state)
        .layer(middleware::from_fn(propagate_request_id))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        .layer(request_id_layer())
        .layer(cors))
}

/// Build CORS layer from configuration.
pub fn build_cors_layer(allowed_origins: &str) -> Result<CorsLayer, ConfigError> {
    if allowed_origins.trim() == "*" {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    // Parse comma-separated origins
    let origins = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<HeaderValue>()
                .map_err(|e| ConfigError::InvalidValue {
                    name: "CORS_ALLOWED_ORIGINS".to_string(),
                    reason: format!("`{s}`: {e}"),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}
