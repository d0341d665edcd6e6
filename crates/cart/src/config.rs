//! Cart service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOEBOX_DATABASE_URL` - `PostgreSQL` connection string (session store)
//! - `SHOEBOX_BASE_URL` - Public URL for the service
//! - `SHOEBOX_SESSION_SECRET` - Cookie signing key material (min 64 chars)
//! - `CATALOG_BASE_URL` - Base URL of the read-only catalog API
//!
//! ## Optional
//! - `SHOEBOX_HOST` - Bind address (default: 127.0.0.1)
//! - `SHOEBOX_PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

// The cookie signing key requires at least 64 bytes of material.
const MIN_SESSION_SECRET_LENGTH: usize = 64;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Cart service configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// `PostgreSQL` connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the service
    pub base_url: String,
    /// Session cookie signing secret
    pub session_secret: SecretString,
    /// Remote catalog API configuration
    pub catalog: CatalogConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Remote catalog API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the catalog's read-only product and stock endpoints.
    pub base_url: Url,
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the session secret is too short to sign cookies with.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SHOEBOX_DATABASE_URL")?;
        let host = get_env_or_default("SHOEBOX_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOEBOX_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SHOEBOX_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOEBOX_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("SHOEBOX_BASE_URL")?;
        let session_secret = SecretString::from(get_required_env("SHOEBOX_SESSION_SECRET")?);
        validate_session_secret(&session_secret, "SHOEBOX_SESSION_SECRET")?;

        let catalog = CatalogConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            catalog,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_required_env("CATALOG_BASE_URL")?;
        let base_url = Url::parse(&raw).map_err(|e| {
            ConfigError::InvalidEnvVar("CATALOG_BASE_URL".to_string(), e.to_string())
        })?;

        Ok(Self { base_url })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    // Fallback to generic DATABASE_URL (set by managed postgres attach)
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that the session secret can key the cookie signer.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> CartConfig {
        CartConfig {
            database_url: SecretString::from("postgres://localhost/shoebox"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("x".repeat(64)),
            catalog: CatalogConfig {
                base_url: Url::parse("http://localhost:3333").unwrap(),
            },
            sentry_dsn: None,
        }
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        let result = validate_session_secret(&secret, "TEST_SESSION");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_session_secret_valid_length() {
        let secret = SecretString::from("a".repeat(64));
        assert!(validate_session_secret(&secret, "TEST_SESSION").is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_config_debug_redacts_secrets() {
        let debug_output = format!("{:?}", test_config());

        // SecretString fields must not leak their contents
        assert!(!debug_output.contains("postgres://localhost/shoebox"));
        assert!(!debug_output.contains("xxxx"));
        assert!(debug_output.contains("localhost:3333"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingEnvVar("CATALOG_BASE_URL".to_string());
        assert_eq!(
            err.to_string(),
            "Missing environment variable: CATALOG_BASE_URL"
        );
    }
}
