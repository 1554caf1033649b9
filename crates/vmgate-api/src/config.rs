//! Service configuration.
//!
//! Loaded from environment variables. The admin password is redacted in
//! Debug output.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_BACKEND_DELAY_MS: u64 = 500;

#[derive(Clone)]
pub struct Config {
    /// Server bind address.
    pub bind_address: String,

    /// Prefix of every href the API returns.
    pub base_url: String,

    /// JSON fixture with roles, users, instances and their subresources.
    pub seed_file: Option<PathBuf>,

    /// Creates an `admin` user holding every privilege when no seed file is given.
    pub admin_password: Option<String>,

    pub request_timeout_seconds: u64,

    /// Time the simulated backend takes to complete a power transition.
    pub backend_delay_ms: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("base_url", &self.base_url)
            .field("seed_file", &self.seed_file)
            .field(
                "admin_password",
                &self.admin_password.as_ref().map(|_| "[REDACTED]"),
            )
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("backend_delay_ms", &self.backend_delay_ms)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid request timeout configuration: {0}")]
    InvalidRequestTimeout(String),

    #[error("Invalid backend delay configuration: {0}")]
    InvalidBackendDelay(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("VMGATE_BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let base_url = vars
            .get("VMGATE_BASE_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(format!(
                "VMGATE_BASE_URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let seed_file = vars
            .get("VMGATE_SEED_FILE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let admin_password = vars
            .get("VMGATE_ADMIN_PASSWORD")
            .filter(|s| !s.is_empty())
            .cloned();

        let request_timeout_seconds =
            if let Some(value_str) = vars.get("VMGATE_REQUEST_TIMEOUT_SECONDS") {
                let value: u64 = value_str.parse().map_err(|e| {
                    ConfigError::InvalidRequestTimeout(format!(
                        "VMGATE_REQUEST_TIMEOUT_SECONDS must be a valid integer, got '{}': {}",
                        value_str, e
                    ))
                })?;

                if value == 0 {
                    return Err(ConfigError::InvalidRequestTimeout(
                        "VMGATE_REQUEST_TIMEOUT_SECONDS must be positive, got 0".to_string(),
                    ));
                }
                value
            } else {
                DEFAULT_REQUEST_TIMEOUT_SECONDS
            };

        let backend_delay_ms = if let Some(value_str) = vars.get("VMGATE_BACKEND_DELAY_MS") {
            value_str.parse().map_err(|e| {
                ConfigError::InvalidBackendDelay(format!(
                    "VMGATE_BACKEND_DELAY_MS must be a valid integer, got '{}': {}",
                    value_str, e
                ))
            })?
        } else {
            DEFAULT_BACKEND_DELAY_MS
        };

        Ok(Config {
            bind_address,
            base_url,
            seed_file,
            admin_password,
            request_timeout_seconds,
            backend_delay_ms,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn backend_delay(&self) -> Duration {
        Duration::from_millis(self.backend_delay_ms)
    }
}
