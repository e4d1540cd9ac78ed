//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub store: StoreConfig,
    pub jwt: JwtConfig,
    pub ingestion: IngestionConfig,
    pub realm: RealmConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(()),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    /// Whole-request limit; uploads run every batch inside it
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Empty when the memory backend is selected
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

/// Which repository implementation backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" | "in-memory" => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

/// Store selection
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
}

/// JWT configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
}

/// Upload ingestion tuning
#[derive(Debug, Clone, Deserialize)]
pub struct IngestionConfig {
    /// Rows committed per transaction
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Upper bound on waiting for a connection / transaction start
    #[serde(default = "default_tx_max_wait_secs")]
    pub tx_max_wait_secs: u64,
    /// Upper bound on one batch transaction's execution
    #[serde(default = "default_tx_timeout_secs")]
    pub tx_timeout_secs: u64,
    #[serde(default = "default_max_upload_size_mb")]
    pub max_upload_size_mb: usize,
    /// Kingdom used when an upload does not name one
    #[serde(default)]
    pub default_kingdom: Option<String>,
}

impl IngestionConfig {
    #[must_use]
    pub fn tx_max_wait(&self) -> Duration {
        Duration::from_secs(self.tx_max_wait_secs)
    }

    #[must_use]
    pub fn tx_timeout(&self) -> Duration {
        Duration::from_secs(self.tx_timeout_secs)
    }

    #[must_use]
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_size_mb * 1024 * 1024
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            tx_max_wait_secs: default_tx_max_wait_secs(),
            tx_timeout_secs: default_tx_timeout_secs(),
            max_upload_size_mb: default_max_upload_size_mb(),
            default_kingdom: None,
        }
    }
}

/// Left-realm heuristic thresholds
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RealmConfig {
    #[serde(default = "default_power_floor")]
    pub power_floor: i64,
    #[serde(default = "default_stale_days")]
    pub stale_days: i64,
}

impl Default for RealmConfig {
    fn default() -> Self {
        Self {
            power_floor: default_power_floor(),
            stale_days: default_stale_days(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "kingdom-tracker".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_true() -> bool {
    true
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_access_token_expiry() -> i64 {
    900 // 15 minutes
}

fn default_batch_size() -> usize {
    20
}

fn default_tx_max_wait_secs() -> u64 {
    10
}

fn default_tx_timeout_secs() -> u64 {
    30
}

fn default_max_upload_size_mb() -> usize {
    10
}

fn default_power_floor() -> i64 {
    kingdom_core::DEFAULT_POWER_FLOOR
}

fn default_stale_days() -> i64 {
    kingdom_core::DEFAULT_STALE_DAYS
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

/// Parse an optional variable, falling back to `default` when unset or blank
fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|s| !s.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = StoreConfig {
            backend: parse_or(&lookup, "STORE_BACKEND", StoreBackend::default())?,
        };

        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None if store.backend == StoreBackend::Memory => String::new(),
            None => return Err(ConfigError::MissingVar("DATABASE_URL")),
        };

        let power_floor = parse_or(&lookup, "REALM_POWER_FLOOR", default_power_floor())?;
        if power_floor < 0 {
            return Err(ConfigError::InvalidValue(
                "REALM_POWER_FLOOR",
                power_floor.to_string(),
            ));
        }

        let stale_days = parse_or(&lookup, "REALM_STALE_DAYS", default_stale_days())?;
        if !(1..=kingdom_core::MAX_STALE_DAYS).contains(&stale_days) {
            return Err(ConfigError::InvalidValue(
                "REALM_STALE_DAYS",
                stale_days.to_string(),
            ));
        }

        let raw_port = lookup("API_PORT").ok_or(ConfigError::MissingVar("API_PORT"))?;
        let api_port = raw_port
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue("API_PORT", raw_port.clone()))?;

        let batch_size = parse_or(&lookup, "INGEST_BATCH_SIZE", default_batch_size())?;
        if batch_size == 0 {
            return Err(ConfigError::InvalidValue("INGEST_BATCH_SIZE", "0".to_string()));
        }

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: parse_or(&lookup, "APP_ENV", Environment::default())?,
            },
            api: ServerConfig {
                host: lookup("API_HOST").unwrap_or_else(default_host),
                port: api_port,
                request_timeout_secs: parse_or(
                    &lookup,
                    "API_REQUEST_TIMEOUT_SECS",
                    default_request_timeout_secs(),
                )?,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_or(
                    &lookup,
                    "DATABASE_MAX_CONNECTIONS",
                    default_max_connections(),
                )?,
                min_connections: parse_or(
                    &lookup,
                    "DATABASE_MIN_CONNECTIONS",
                    default_min_connections(),
                )?,
                run_migrations: parse_or(&lookup, "DATABASE_RUN_MIGRATIONS", true)?,
            },
            store,
            jwt: JwtConfig {
                secret: lookup("JWT_SECRET").ok_or(ConfigError::MissingVar("JWT_SECRET"))?,
                access_token_expiry: parse_or(
                    &lookup,
                    "JWT_ACCESS_TOKEN_EXPIRY",
                    default_access_token_expiry(),
                )?,
            },
            ingestion: IngestionConfig {
                batch_size,
                tx_max_wait_secs: parse_or(
                    &lookup,
                    "INGEST_TX_MAX_WAIT_SECS",
                    default_tx_max_wait_secs(),
                )?,
                tx_timeout_secs: parse_or(
                    &lookup,
                    "INGEST_TX_TIMEOUT_SECS",
                    default_tx_timeout_secs(),
                )?,
                max_upload_size_mb: parse_or(
                    &lookup,
                    "MAX_UPLOAD_SIZE_MB",
                    default_max_upload_size_mb(),
                )?,
                default_kingdom: lookup("DEFAULT_KINGDOM").filter(|s| !s.trim().is_empty()),
            },
            realm: RealmConfig {
                power_floor,
                stale_days,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: parse_or(
                    &lookup,
                    "RATE_LIMIT_REQUESTS_PER_SECOND",
                    default_requests_per_second(),
                )?,
                burst: parse_or(&lookup, "RATE_LIMIT_BURST", default_burst())?,
            },
            cors: CorsConfig {
                allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            snowflake: SnowflakeConfig {
                worker_id: parse_or(&lookup, "WORKER_ID", 0)?,
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("API_PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/kingdom"),
            ("JWT_SECRET", "secret"),
        ]
    }

    #[test]
    fn test_environment_is_production() {
        assert!(!Environment::Development.is_production());
        assert!(!Environment::Staging.is_production());
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_server_address() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 120,
        };
        assert_eq!(config.address(), "0.0.0.0:8080");
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_lookup(lookup_from(&minimal())).unwrap();

        assert_eq!(config.app.name, "kingdom-tracker");
        assert_eq!(config.store.backend, StoreBackend::Postgres);
        assert_eq!(config.ingestion.batch_size, 20);
        assert_eq!(config.ingestion.tx_max_wait(), Duration::from_secs(10));
        assert_eq!(config.ingestion.tx_timeout(), Duration::from_secs(30));
        assert_eq!(config.ingestion.max_upload_bytes(), 10 * 1024 * 1024);
        assert_eq!(config.realm.power_floor, 10_000_000);
        assert_eq!(config.realm.stale_days, 7);
        assert!(config.database.run_migrations);
        assert_eq!(config.jwt.access_token_expiry, 900);
    }

    #[test]
    fn test_missing_database_url_is_an_error_for_postgres() {
        let vars = [("API_PORT", "8080"), ("JWT_SECRET", "secret")];
        let err = AppConfig::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("DATABASE_URL")));
    }

    #[test]
    fn test_memory_backend_does_not_need_database_url() {
        let vars = [
            ("API_PORT", "8080"),
            ("JWT_SECRET", "secret"),
            ("STORE_BACKEND", "memory"),
        ];
        let config = AppConfig::from_lookup(lookup_from(&vars)).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(config.database.url.is_empty());
    }

    #[test]
    fn test_malformed_value_is_reported() {
        let mut vars = minimal();
        vars.push(("INGEST_BATCH_SIZE", "twenty"));
        let err = AppConfig::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("INGEST_BATCH_SIZE", _)));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut vars = minimal();
        vars.push(("INGEST_BATCH_SIZE", "0"));
        assert!(AppConfig::from_lookup(lookup_from(&vars)).is_err());
    }

    #[test]
    fn test_stale_days_out_of_range_rejected() {
        for raw in ["0", "-1", "36501", "9223372036854775807"] {
            let mut vars = minimal();
            vars.push(("REALM_STALE_DAYS", raw));
            let err = AppConfig::from_lookup(lookup_from(&vars)).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue("REALM_STALE_DAYS", _)),
                "{raw} was accepted"
            );
        }
    }

    #[test]
    fn test_overrides() {
        let mut vars = minimal();
        vars.extend([
            ("REALM_POWER_FLOOR", "5000000"),
            ("REALM_STALE_DAYS", "14"),
            ("DEFAULT_KINGDOM", "k-1042"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test,"),
            ("APP_ENV", "production"),
        ]);
        let config = AppConfig::from_lookup(lookup_from(&vars)).unwrap();

        assert_eq!(config.realm.power_floor, 5_000_000);
        assert_eq!(config.realm.stale_days, 14);
        assert_eq!(config.ingestion.default_kingdom.as_deref(), Some("k-1042"));
        assert_eq!(config.cors.allowed_origins, vec!["http://a.test", "http://b.test"]);
        assert!(config.app.env.is_production());
    }
}
