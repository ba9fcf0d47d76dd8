//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `AETHER_HOST` - Bind address (default: 127.0.0.1)
//! - `AETHER_PORT` - Listen port (default: 3001)
//! - `AETHER_ACTIVITY_INTERVAL_SECS` - Live activity broadcast period (default: 6)
//! - `AETHER_CLIENT_BUFFER` - Outbound frames buffered per client (default: 64)
//! - `AETHER_CATALOG_PATH` - JSON file replacing the built-in product seed
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "3001";
const DEFAULT_ACTIVITY_INTERVAL_SECS: &str = "6";
const DEFAULT_CLIENT_BUFFER: &str = "64";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Period between live activity broadcasts
    pub activity_interval: Duration,
    /// Outbound frames buffered per connected client before frames are dropped
    pub client_buffer: usize,
    /// Optional JSON file with the catalog seed
    pub catalog_path: Option<PathBuf>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3001,
            activity_interval: Duration::from_secs(6),
            client_buffer: 64,
            catalog_path: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to a value that cannot be
    /// parsed or is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env::<IpAddr>("AETHER_HOST", DEFAULT_HOST)?;
        let port = parse_env::<u16>("AETHER_PORT", DEFAULT_PORT)?;

        let interval_secs =
            parse_env::<u64>("AETHER_ACTIVITY_INTERVAL_SECS", DEFAULT_ACTIVITY_INTERVAL_SECS)?;
        let activity_interval = positive_interval(interval_secs)?;

        let client_buffer = parse_env::<usize>("AETHER_CLIENT_BUFFER", DEFAULT_CLIENT_BUFFER)?;
        if client_buffer == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "AETHER_CLIENT_BUFFER".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            activity_interval,
            client_buffer,
            catalog_path: get_optional_env("AETHER_CATALOG_PATH").map(PathBuf::from),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn positive_interval(secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            "AETHER_ACTIVITY_INTERVAL_SECS".to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}
