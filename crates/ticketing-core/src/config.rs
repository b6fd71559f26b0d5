//! Configuration management for the ticketing client

use crate::payment::PaymentConfig;
use crate::policy::UploadPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding the backend base URL
pub const API_URL_ENV: &str = "TICKETING_API_URL";

/// Backend used by debug builds when no URL is configured
pub const LOCAL_API_URL: &str = "http://localhost:8000";

/// Backend used by release builds when no URL is configured
pub const HOSTED_API_URL: &str = "https://event-ticketing-system-devx.onrender.com";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Payment screenshot constraints
    #[serde(default)]
    pub upload: UploadPolicy,

    /// Payment details for the event
    #[serde(default)]
    pub payment: PaymentConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Total request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_base_url() -> String {
    std::env::var(API_URL_ENV)
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| {
            if cfg!(debug_assertions) {
                LOCAL_API_URL.to_string()
            } else {
                HOSTED_API_URL.to_string()
            }
        })
}

const fn default_request_timeout() -> u64 {
    30
}

const fn default_connect_timeout() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            upload: UploadPolicy::default(),
            payment: PaymentConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Join a path onto the base URL
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Config {
    /// Load configuration from `ticketing.toml` (if present) and environment
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or parsed.
    pub fn load() -> crate::Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an explicit file, then environment
    ///
    /// Environment variables use the `TICKETING` prefix and `__` between
    /// sections, e.g. `TICKETING_UPLOAD__MAX_FILE_SIZE`. `TICKETING_API_URL`
    /// is honoured as a shorthand for the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or invalid.
    pub fn load_from(path: Option<&Path>) -> crate::Result<Self> {
        let file_source = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("ticketing").required(false),
        };

        let config = config::Config::builder()
            .add_source(file_source)
            .add_source(
                config::Environment::with_prefix("TICKETING")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| crate::Error::Configuration {
                message: e.to_string(),
            })?;

        let mut loaded: Self = config
            .try_deserialize()
            .map_err(|e| crate::Error::Configuration {
                message: e.to_string(),
            })?;

        if let Some(url) = std::env::var(API_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
        {
            loaded.api.base_url = url;
        }

        loaded.validate()?;
        Ok(loaded)
    }

    /// Check the configuration for values the client cannot work with
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first problem found.
    pub fn validate(&self) -> crate::Result<()> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(crate::Error::Configuration {
                message: "api.base_url must not be empty".to_string(),
            });
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(crate::Error::Configuration {
                message: format!("api.base_url must be an http(s) URL, got '{base_url}'"),
            });
        }
        if self.upload.max_file_size == 0 {
            return Err(crate::Error::Configuration {
                message: "upload.max_file_size must be greater than zero".to_string(),
            });
        }
        if self.upload.allowed_types.is_empty() {
            return Err(crate::Error::Configuration {
                message: "upload.allowed_types must list at least one MIME type".to_string(),
            });
        }
        Ok(())
    }
}
