//! Application state shared across handlers.

use std::sync::Arc;

use bookshelf_store::Gateway;

use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// The gateway is constructed once at startup and injected here; handlers
/// only ever read it. Cloning is cheap and can be extracted in handlers
/// using `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Collection gateway.
    gateway: Arc<dyn Gateway>,
    /// Server configuration.
    config: Arc<ServerConfig>,
}

impl AppState {
    /// Create new application state.
    pub fn new(gateway: Arc<dyn Gateway>, config: ServerConfig) -> Self {
        Self {
            gateway,
            config: Arc::new(config),
        }
    }

    /// Get a reference to the collection gateway.
    pub fn gateway(&self) -> &dyn Gateway {
        self.gateway.as_ref()
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("store_health", &self.gateway.health())
            .finish_non_exhaustive()
    }
}
