//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "civicreport.toml",
    "./config/config.toml",
    "/etc/civicreport/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        self.apply_env_overrides(&mut config);

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        if let Ok(path) = env::var("CIVICREPORT_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        for path in CONFIG_PATHS {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Apply environment variable overrides.
    ///
    /// The variable names follow the deployment environment of the hosted
    /// services (SUPABASE_*, CLOUDINARY_*) so the same .env works for both
    /// local development and production.
    fn apply_env_overrides(&self, config: &mut AppConfig) {
        // HTTP
        if let Ok(val) = env::var("PORT") {
            if let Ok(port) = val.parse() {
                config.http.port = port;
            }
        }
        if let Ok(val) = env::var("HTTP_HOST") {
            config.http.host = val;
        }
        if let Ok(val) = env::var("CORS_ORIGINS") {
            config.http.cors_origins = val.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Remote row store / identity provider
        if let Ok(val) = env::var("SUPABASE_URL") {
            config.remote.url = val;
        }
        if let Ok(val) = env::var("SUPABASE_KEY") {
            config.remote.api_key = val;
        }
        if let Ok(val) = env::var("SUPABASE_SERVICE_ROLE_KEY") {
            config.remote.service_role_key = Some(val);
        }

        // Image host
        if let Ok(val) = env::var("CLOUDINARY_CLOUD_NAME") {
            config.media.cloud_name = val;
        }
        if let Ok(val) = env::var("CLOUDINARY_API_KEY") {
            config.media.api_key = val;
        }
        if let Ok(val) = env::var("CLOUDINARY_API_SECRET") {
            config.media.api_secret = val;
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
