//! CivicReport Configuration System
//!
//! TOML-based configuration with environment variable override support.
//! The configuration is built exactly once at process start and handed to
//! components by value; there are no ambient globals.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub remote: RemoteStoreConfig,
    pub media: MediaConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            remote: RemoteStoreConfig::default(),
            media: MediaConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Validate that the settings required to reach the hosted services
    /// are present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote.url.is_empty() {
            return Err(ConfigError::ValidationError(
                "remote.url (SUPABASE_URL) is required".to_string(),
            ));
        }
        if self.remote.api_key.is_empty() {
            return Err(ConfigError::ValidationError(
                "remote.api_key (SUPABASE_KEY) is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Hosted row store / identity provider configuration.
///
/// `url` is the base project URL; the REST and auth endpoints live under
/// `/rest/v1` and `/auth/v1` respectively.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteStoreConfig {
    pub url: String,
    pub api_key: String,
    pub service_role_key: Option<String>,
}

impl RemoteStoreConfig {
    pub fn rest_base(&self) -> String {
        format!("{}/rest/v1", self.url.trim_end_matches('/'))
    }

    pub fn auth_base(&self) -> String {
        format!("{}/auth/v1", self.url.trim_end_matches('/'))
    }
}

/// Hosted image host configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}
