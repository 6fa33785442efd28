//! Configuration module for Nimbus.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::{NimbusError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/nimbus.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Bearer token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Symmetric signing secret. Must be set before startup.
    #[serde(default)]
    pub secret_key: String,
    /// Token issuer (`iss` claim).
    #[serde(default = "default_jwt_issuer")]
    pub issuer: String,
    /// Token audience (`aud` claim).
    #[serde(default = "default_jwt_audience")]
    pub audience: String,
    /// Token lifetime in minutes.
    #[serde(default = "default_jwt_expiration")]
    pub expiration_minutes: i64,
}

fn default_jwt_issuer() -> String {
    "NimbusAPI".to_string()
}

fn default_jwt_audience() -> String {
    "NimbusAPI".to_string()
}

fn default_jwt_expiration() -> i64 {
    1440
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            issuer: default_jwt_issuer(),
            audience: default_jwt_audience(),
            expiration_minutes: default_jwt_expiration(),
        }
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of iterations.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_kib() -> u32 {
    65536
}

fn default_iterations() -> u32 {
    3
}

fn default_parallelism() -> u32 {
    4
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

/// Weather cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of a cached weather result in minutes.
    #[serde(default = "default_weather_ttl")]
    pub weather_ttl_minutes: u64,
}

fn default_weather_ttl() -> u64 {
    30
}

impl CacheConfig {
    /// Cache lifetime as a duration.
    pub fn weather_ttl(&self) -> Duration {
        Duration::from_secs(self.weather_ttl_minutes * 60)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            weather_ttl_minutes: default_weather_ttl(),
        }
    }
}

/// Request rate configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Requests accepted per window on the weather route.
    #[serde(default = "default_permit_limit")]
    pub permit_limit: u32,
    /// Length of the fixed window in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Register/login requests per minute per client IP.
    #[serde(default = "default_login_rate_limit")]
    pub login_rate_limit: u32,
}

fn default_permit_limit() -> u32 {
    10
}

fn default_window_secs() -> u64 {
    60
}

fn default_login_rate_limit() -> u32 {
    30
}

impl RateLimitConfig {
    /// Window length as a duration.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            permit_limit: default_permit_limit(),
            window_secs: default_window_secs(),
            login_rate_limit: default_login_rate_limit(),
        }
    }
}

/// Optional registration rules applied on top of the non-empty checks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationConfig {
    /// Minimum username length in characters.
    #[serde(default)]
    pub min_username_length: Option<usize>,
    /// Maximum username length in characters.
    #[serde(default)]
    pub max_username_length: Option<usize>,
    /// Minimum password length in characters.
    #[serde(default)]
    pub min_password_length: Option<usize>,
}

/// Weather data source configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    /// Path to the JSON weather data file.
    #[serde(default = "default_weather_data_path")]
    pub data_path: String,
}

fn default_weather_data_path() -> String {
    "data/weather-data.json".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            data_path: default_weather_data_path(),
        }
    }
}

/// Locale configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LocaleConfig {
    /// Language code for response messages.
    #[serde(default = "default_language")]
    pub language: String,
    /// Directory holding `<language>.toml` catalogues.
    #[serde(default = "default_locales_path")]
    pub path: String,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_locales_path() -> String {
    "locales".to_string()
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            path: default_locales_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file path.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/nimbus.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Token configuration.
    #[serde(default)]
    pub jwt: JwtConfig,
    /// Password hashing configuration.
    #[serde(default)]
    pub hashing: HashingConfig,
    /// Cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Rate limit configuration.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Credential rules.
    #[serde(default)]
    pub validation: ValidationConfig,
    /// Weather data configuration.
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Locale configuration.
    #[serde(default)]
    pub locale: LocaleConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(NimbusError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| NimbusError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `NIMBUS_JWT_SECRET`: Override the token signing secret
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("NIMBUS_JWT_SECRET") {
            if !secret.is_empty() {
                self.jwt.secret_key = secret;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the token signing secret is not set
    /// - the token lifetime is not positive
    /// - the rate window or permit limit is zero
    pub fn validate(&self) -> Result<()> {
        if self.jwt.secret_key.is_empty() {
            return Err(NimbusError::Config(
                "jwt.secret_key is not set. \
                 Set it in config.toml or via NIMBUS_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.jwt.expiration_minutes <= 0 {
            return Err(NimbusError::Config(
                "jwt.expiration_minutes must be positive".to_string(),
            ));
        }
        if self.rate_limit.window_secs == 0 || self.rate_limit.permit_limit == 0 {
            return Err(NimbusError::Config(
                "rate_limit.window_secs and rate_limit.permit_limit must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
