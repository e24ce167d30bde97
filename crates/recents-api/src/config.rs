use config::{Config as ConfigLoader, ConfigError, Environment, File};
use recents_types::{ClearUnreadStrategy, SyncConfig};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub sync: SyncSettings,
    pub logging: LoggingConfig,
    #[serde(default = "default_environment")]
    pub environment: String,

    // Secrets (from ENV only)
    #[serde(default)]
    pub mongodb_uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Mongodb,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    pub database: String,
    pub pool_size: u32,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncSettings {
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    #[serde(default)]
    pub clear_strategy: ClearUnreadStrategy,
    #[serde(default)]
    pub invalidate_on_write: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
            recent_limit: default_recent_limit(),
            clear_strategy: ClearUnreadStrategy::default(),
            invalidate_on_write: false,
        }
    }
}

impl From<&SyncSettings> for SyncConfig {
    fn from(settings: &SyncSettings) -> Self {
        SyncConfig::new()
            .with_cache_ttl(Duration::from_secs(settings.cache_ttl_secs))
            .with_recent_limit(settings.recent_limit)
            .with_clear_strategy(settings.clear_strategy)
            .with_invalidate_on_write(settings.invalidate_on_write)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_cache_ttl() -> u64 {
    30
}

fn default_recent_limit() -> usize {
    20
}

/// Short environment variable names and the keys they override.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("SERVER_HOST", "server.host"),
    ("SERVER_PORT", "server.port"),
    ("SERVER_REQUEST_TIMEOUT_SECS", "server.request_timeout_secs"),
    ("STORAGE_BACKEND", "storage.backend"),
    ("STORAGE_DATABASE", "storage.database"),
    ("STORAGE_POOL_SIZE", "storage.pool_size"),
    ("STORAGE_TIMEOUT_MS", "storage.timeout_ms"),
    ("SYNC_CACHE_TTL_SECS", "sync.cache_ttl_secs"),
    ("SYNC_RECENT_LIMIT", "sync.recent_limit"),
    ("SYNC_CLEAR_STRATEGY", "sync.clear_strategy"),
    ("SYNC_INVALIDATE_ON_WRITE", "sync.invalidate_on_write"),
    ("LOG_LEVEL", "logging.level"),
    ("LOG_FORMAT", "logging.format"),
];

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Nested `RECENTS__SECTION__KEY` variables
    /// 4. Short variables (`SERVER_PORT`, `STORAGE_BACKEND`, `SYNC_*`, `LOG_*`)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let mut builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("RECENTS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("environment", env.clone())?;

        for (var, key) in ENV_OVERRIDES {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(*key, value)?;
            }
        }

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Load secrets from ENV (not in TOML)
        if let Ok(uri) = std::env::var("MONGODB_URI") {
            cfg.mongodb_uri = uri;
        }
        cfg.validate()?;

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder()
            .add_source(File::from(path.as_ref()));

        let cfg: Config = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackend::Mongodb && self.mongodb_uri.is_empty() {
            return Err(ConfigError::Message(
                "MONGODB_URI environment variable is required for the mongodb backend".to_string(),
            ));
        }
        if self.sync.recent_limit == 0 {
            return Err(ConfigError::Message("sync.recent_limit must be positive".to_string()));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig::from(&self.sync)
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        environment = "production"

        [server]
        host = "127.0.0.1"
        port = 3000

        [cors]
        enabled = true
        origins = ["http://localhost:3000"]

        [storage]
        backend = "mongodb"
        database = "test"
        pool_size = 5
        timeout_ms = 3000

        [sync]
        cache_ttl_secs = 10
        clear_strategy = "zero_summary"

        [logging]
        level = "debug"
        format = "json"
    "#;

    #[test]
    fn test_config_structure() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.storage.backend, StorageBackend::Mongodb);
        assert!(config.is_production());

        let sync = config.sync_config();
        assert_eq!(sync.cache_ttl, Duration::from_secs(10));
        assert_eq!(sync.recent_limit, 20);
        assert_eq!(sync.clear_strategy, ClearUnreadStrategy::ZeroSummary);
        assert!(!sync.invalidate_on_write);
    }

    #[test]
    fn test_mongodb_backend_requires_uri() {
        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        assert!(config.validate().is_err());

        config.mongodb_uri = "mongodb://localhost:27017".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sync_section_is_optional() {
        let toml = r#"
            [server]
            host = "0.0.0.0"
            port = 8000

            [cors]
            enabled = false
            origins = []

            [storage]
            database = "recents"
            pool_size = 10
            timeout_ms = 5000

            [logging]
            level = "info"
            format = "pretty"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.sync.clear_strategy, ClearUnreadStrategy::MarkSeen);
        assert_eq!(config.environment, "dev");
        assert!(config.validate().is_ok());
    }
}
