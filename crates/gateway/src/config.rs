//! Gateway configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GATEWAY_HOST` - Bind address (default: 0.0.0.0)
//! - `GATEWAY_PORT` - Listen port (default: 9889)
//! - `GATEWAY_DEBUG` - Verbose logging (`true`/`1`, default: false)
//! - `GATEWAY_SEED_FILE` - JSON fixture loaded into the in-memory store
//! - `CARRIER_BASE_URL` - Carrier API root (default: <https://services.giaohangtietkiem.vn/>)
//! - `CARRIER_TIMEOUT_SECS` - Per-call carrier timeout (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)
//!
//! Command-line flags (`--port`, `--debug`) take precedence over the
//! environment; see `main.rs`.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default carrier API root.
pub const DEFAULT_CARRIER_BASE_URL: &str = "https://services.giaohangtietkiem.vn/";

const DEFAULT_PORT: &str = "9889";
const DEFAULT_CARRIER_TIMEOUT_SECS: &str = "30";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Enables debug-level logging
    pub debug: bool,
    /// Carrier API settings
    pub carrier: CarrierConfig,
    /// Optional JSON fixture for the in-memory store
    pub seed_file: Option<PathBuf>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
}

/// Carrier API configuration.
#[derive(Debug, Clone)]
pub struct CarrierConfig {
    /// API root; endpoint paths are joined onto it.
    pub base_url: Url,
    /// Upper bound on a single carrier call.
    pub timeout: Duration,
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            base_url: default_carrier_url(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("GATEWAY_HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("GATEWAY_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("GATEWAY_PORT", DEFAULT_PORT)
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("GATEWAY_PORT".to_string(), e.to_string()))?;
        let debug = get_optional_env("GATEWAY_DEBUG")
            .map(|v| parse_bool("GATEWAY_DEBUG", &v))
            .transpose()?
            .unwrap_or(false);

        let carrier = CarrierConfig::from_env()?;
        let seed_file = get_optional_env("GATEWAY_SEED_FILE").map(PathBuf::from);
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            debug,
            carrier,
            seed_file,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CarrierConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = match get_optional_env("CARRIER_BASE_URL") {
            Some(raw) => parse_base_url(&raw)?,
            None => default_carrier_url(),
        };
        let timeout_secs = get_env_or_default("CARRIER_TIMEOUT_SECS", DEFAULT_CARRIER_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CARRIER_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CARRIER_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

#[allow(clippy::expect_used)] // constant, covered by tests
fn default_carrier_url() -> Url {
    Url::parse(DEFAULT_CARRIER_BASE_URL).expect("default carrier URL is valid")
}

/// Parse a carrier base URL, making sure it ends with `/` so that endpoint
/// paths join below it instead of replacing its last segment.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("CARRIER_BASE_URL".to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            "CARRIER_BASE_URL".to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_carrier_url() {
        let url = default_carrier_url();
        assert_eq!(url.as_str(), DEFAULT_CARRIER_BASE_URL);
        assert_eq!(
            url.join("services/shipment/order").unwrap().as_str(),
            "https://services.giaohangtietkiem.vn/services/shipment/order"
        );
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = parse_base_url("http://127.0.0.1:8080/carrier").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/carrier/");
        assert_eq!(
            url.join("services/label/X").unwrap().as_str(),
            "http://127.0.0.1:8080/carrier/services/label/X"
        );
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        let err = parse_base_url("not a url").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "CARRIER_BASE_URL"));
        assert!(parse_base_url("mailto:ops@example.com").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "true").unwrap());
        assert!(parse_bool("X", "1").unwrap());
        assert!(!parse_bool("X", "off").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = GatewayConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 9889,
            debug: false,
            carrier: CarrierConfig::default(),
            seed_file: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 9889);
    }

    #[test]
    fn test_default_timeout_is_bounded() {
        assert_eq!(CarrierConfig::default().timeout, Duration::from_secs(30));
    }
}
