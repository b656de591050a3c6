//! Server configuration from environment variables.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use bookshelf_store::StoreConfig;

/// Port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 5000;

/// Upper bound for `limit` when `MAX_PAGE_SIZE` is unset.
pub const DEFAULT_MAX_PAGE_SIZE: u64 = 100;

/// Which gateway the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// MongoDB via `MONGODB_URI`.
    MongoDb,
    /// In-process store, lost on exit.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(Self::MongoDb),
            "memory" => Ok(Self::Memory),
            other => Err(format!("expected `mongodb` or `memory`, got `{other}`")),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected `pretty` or `json`, got `{other}`")),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server port to listen on.
    pub port: u16,
    /// Gateway implementation to use.
    pub store_backend: StoreBackend,
    /// Paginated listing when true, plain arrays when false.
    pub pagination: bool,
    /// Largest accepted `limit` query value.
    pub max_page_size: u64,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
    /// CORS allowed origins (comma-separated or "*" for all).
    pub cors_allowed_origins: String,
    /// Document store connection settings.
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            store_backend: StoreBackend::MongoDb,
            pagination: true,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            cors_allowed_origins: "*".to_string(),
            store: StoreConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `PORT`: Server port (default: 5000)
    /// - `STORE_BACKEND`: `mongodb` or `memory` (default: `mongodb`)
    /// - `PAGINATION`: Paginated list responses (default: true)
    /// - `MAX_PAGE_SIZE`: Largest accepted `limit` (default: 100)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `LOG_FORMAT`: `pretty` or `json` (default: "pretty")
    /// - `CORS_ALLOWED_ORIGINS`: Allowed CORS origins (default: "*")
    ///
    /// Store connection:
    /// - `MONGODB_URI`: Connection string, required for the `mongodb` backend
    /// - `DATABASE_NAME`: Database when the URI names none (default: `bookshelf`)
    /// - `STORE_CONNECT_ATTEMPTS`: Startup handshake attempts (default: 5)
    /// - `STORE_RETRY_DELAY_MS`: First retry wait, zero allowed (default: 500)
    /// - `STORE_SELECTION_TIMEOUT_MS`: Driver server selection timeout (default: 5000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let store_backend = parse_var(&lookup, "STORE_BACKEND", str::parse)?
            .unwrap_or(defaults.store_backend);

        Ok(Self {
            port: parse_var(&lookup, "PORT", str::parse)?.unwrap_or(defaults.port),
            store_backend,
            store: store_from_lookup(&lookup, store_backend, defaults.store)?,
            pagination: parse_var(&lookup, "PAGINATION", parse_flag)?
                .unwrap_or(defaults.pagination),
            max_page_size: parse_var(&lookup, "MAX_PAGE_SIZE", parse_positive::<u64>)?
                .unwrap_or(defaults.max_page_size),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: parse_var(&lookup, "LOG_FORMAT", str::parse)?
                .unwrap_or(defaults.log_format),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .unwrap_or(defaults.cors_allowed_origins),
        })
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn store_from_lookup<F>(
    lookup: &F,
    backend: StoreBackend,
    defaults: StoreConfig,
) -> Result<StoreConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let uri = match lookup("MONGODB_URI").filter(|uri| !uri.trim().is_empty()) {
        Some(uri) => uri,
        None if backend == StoreBackend::MongoDb => {
            return Err(ConfigError::MissingEnvVar("MONGODB_URI".to_string()));
        }
        None => defaults.uri,
    };

    let mut retry = defaults.retry;
    if let Some(attempts) = parse_var(lookup, "STORE_CONNECT_ATTEMPTS", parse_positive::<u32>)? {
        retry.max_attempts = attempts;
    }
    if let Some(ms) = parse_var(lookup, "STORE_RETRY_DELAY_MS", |raw| raw.parse::<u64>())? {
        retry.base_delay = Duration::from_millis(ms);
    }

    Ok(StoreConfig {
        uri,
        database: lookup("DATABASE_NAME").unwrap_or(defaults.database),
        server_selection_timeout: parse_var(
            lookup,
            "STORE_SELECTION_TIMEOUT_MS",
            parse_positive::<u64>,
        )?
        .map(Duration::from_millis)
        .unwrap_or(defaults.server_selection_timeout),
        retry,
    })
}

fn parse_var<F, T, P, E>(lookup: &F, name: &str, parse: P) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Result<T, E>,
    E: Display,
{
    match lookup(name) {
        Some(raw) => parse(raw.trim())
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean, got `{other}`")),
    }
}

fn parse_positive<T>(raw: &str) -> Result<T, String>
where
    T: FromStr + Default + PartialEq,
    T::Err: Display,
{
    let n = raw.parse::<T>().map_err(|e| e.to_string())?;
    if n == T::default() {
        return Err("must be greater than zero".to_string());
    }
    Ok(n)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    const URI: (&str, &str) = ("MONGODB_URI", "mongodb://db.internal:27017");

    #[test]
    fn test_default_values() {
        let config = ServerConfig::from_lookup(lookup(&[URI])).unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.store_backend, StoreBackend::MongoDb);
        assert!(config.pagination);
        assert_eq!(config.max_page_size, 100);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.cors_allowed_origins, "*");

        assert_eq!(config.store.uri, "mongodb://db.internal:27017");
        assert_eq!(config.store.database, "bookshelf");
        assert_eq!(config.store.retry.max_attempts, 5);
        assert_eq!(config.store.retry.base_delay, Duration::from_millis(500));
        assert_eq!(config.store.server_selection_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("STORE_BACKEND", "memory"),
            ("PAGINATION", "false"),
            ("MAX_PAGE_SIZE", "25"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(!config.pagination);
        assert_eq!(config.max_page_size, 25);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.socket_addr().port(), 8080);
    }

    #[test]
    fn test_missing_uri_for_mongodb() {
        let err = ServerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref name) if name == "MONGODB_URI"));

        let err = ServerConfig::from_lookup(lookup(&[("MONGODB_URI", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn test_memory_backend_needs_no_uri() {
        let config = ServerConfig::from_lookup(lookup(&[("STORE_BACKEND", "memory")])).unwrap();
        assert_eq!(config.store.uri, StoreConfig::default().uri);
    }

    #[test]
    fn test_store_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            URI,
            ("DATABASE_NAME", "library"),
            ("STORE_CONNECT_ATTEMPTS", "2"),
            ("STORE_RETRY_DELAY_MS", "0"),
            ("STORE_SELECTION_TIMEOUT_MS", "1500"),
        ]))
        .unwrap();

        assert_eq!(config.store.database, "library");
        assert_eq!(config.store.retry.max_attempts, 2);
        assert_eq!(config.store.retry.base_delay, Duration::ZERO);
        assert_eq!(
            config.store.server_selection_timeout,
            Duration::from_millis(1500)
        );
    }

    #[test]
    fn test_invalid_store_values() {
        for (name, raw) in [
            ("STORE_CONNECT_ATTEMPTS", "0"),
            ("STORE_CONNECT_ATTEMPTS", "many"),
            ("STORE_RETRY_DELAY_MS", "-5"),
            ("STORE_SELECTION_TIMEOUT_MS", "0"),
        ] {
            let err = ServerConfig::from_lookup(lookup(&[URI, (name, raw)])).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { name: ref got, .. } if got == name),
                "{name}={raw}: {err}"
            );
        }
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_lookup(lookup(&[URI, ("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref name, .. } if name == "PORT"));
    }

    #[test]
    fn test_invalid_backend() {
        let err = ServerConfig::from_lookup(lookup(&[URI, ("STORE_BACKEND", "redis")])).unwrap_err();
        assert!(err.to_string().contains("STORE_BACKEND"));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(ServerConfig::from_lookup(lookup(&[URI, ("MAX_PAGE_SIZE", "0")])).is_err());
    }
}
