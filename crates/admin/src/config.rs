//! Catalog configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TESLO_API_BASE_URL` - Base URL of the products API (e.g., `http://localhost:3000/api`)
//!
//! ## Optional
//! - `TESLO_API_TOKEN` - Bearer token attached to every API request
//! - `TESLO_LIST_CACHE_CAPACITY` - Max cached list pages (default: 256)
//! - `TESLO_PRODUCT_CACHE_CAPACITY` - Max cached single products (default: 1000)
//! - `TESLO_CACHE_TTL_SECS` - Cache time-to-live in seconds, `0` disables expiry (default: 300)
//! - `TESLO_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: transport default)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_LIST_CACHE_CAPACITY: u64 = 256;
const DEFAULT_PRODUCT_CACHE_CAPACITY: u64 = 1000;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Catalog client configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct CatalogConfig {
    /// Base URL of the products API, without a trailing slash
    pub base_url: Url,
    /// Optional bearer token for write endpoints
    pub api_token: Option<SecretString>,
    /// Request timeout; `None` keeps the transport default
    pub timeout: Option<Duration>,
    /// Cache sizing and expiry
    pub cache: CacheSettings,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("cache", &self.cache)
            .finish()
    }
}

/// Sizing and expiry of the two cache tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// Max number of cached list pages
    pub list_capacity: u64,
    /// Max number of cached single products
    pub product_capacity: u64,
    /// Entry time-to-live; `None` keeps entries until evicted by capacity
    pub ttl: Option<Duration>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            list_capacity: DEFAULT_LIST_CACHE_CAPACITY,
            product_capacity: DEFAULT_PRODUCT_CACHE_CAPACITY,
            ttl: Some(Duration::from_secs(DEFAULT_CACHE_TTL_SECS)),
        }
    }
}

impl CatalogConfig {
    /// Create a configuration for `base_url` with default cache settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("TESLO_API_BASE_URL", base_url)?,
            api_token: None,
            timeout: None,
            cache: CacheSettings::default(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = parse_base_url(
            "TESLO_API_BASE_URL",
            &get_required_env("TESLO_API_BASE_URL")?,
        )?;
        let api_token = get_optional_env("TESLO_API_TOKEN").map(SecretString::from);
        let timeout = get_optional_env("TESLO_HTTP_TIMEOUT_SECS")
            .map(|s| parse_u64("TESLO_HTTP_TIMEOUT_SECS", &s))
            .transpose()?
            .map(Duration::from_secs);

        let cache = CacheSettings::from_env()?;

        Ok(Self {
            base_url,
            api_token,
            timeout,
            cache,
        })
    }

    /// Base URL as a string without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }
}

impl CacheSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let list_capacity = parse_u64(
            "TESLO_LIST_CACHE_CAPACITY",
            &get_env_or_default(
                "TESLO_LIST_CACHE_CAPACITY",
                &DEFAULT_LIST_CACHE_CAPACITY.to_string(),
            ),
        )?;
        let product_capacity = parse_u64(
            "TESLO_PRODUCT_CACHE_CAPACITY",
            &get_env_or_default(
                "TESLO_PRODUCT_CACHE_CAPACITY",
                &DEFAULT_PRODUCT_CACHE_CAPACITY.to_string(),
            ),
        )?;
        let ttl_secs = parse_u64(
            "TESLO_CACHE_TTL_SECS",
            &get_env_or_default("TESLO_CACHE_TTL_SECS", &DEFAULT_CACHE_TTL_SECS.to_string()),
        )?;

        Ok(Self {
            list_capacity,
            product_capacity,
            ttl: (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs)),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse an absolute http(s) base URL.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(url)
}
