//! Application settings.
//!
//! Settings come from three places, later ones winning:
//! built-in defaults, an optional `config.toml`, then the environment
//! (`APP_PORT`, `DATABASE_URL`). Everything is resolved once at startup and
//! never changes afterwards.

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Port the listener binds when nothing else is configured.
pub const DEFAULT_PORT: &str = "8080";

/// Config file read when `APP_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Fully resolved application settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Listening port, kept as text like the environment hands it over
    pub port: String,
    /// Store connection target
    pub database_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

/// Shape of config.toml; every section and key is optional
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    /// `[server]` table
    #[serde(default)]
    pub server: ServerSection,
    /// `[database]` table
    #[serde(default)]
    pub database: DatabaseSection,
}

/// `[server]` table of config.toml
#[derive(Debug, Default, Deserialize)]
pub struct ServerSection {
    /// Listening port
    pub port: Option<String>,
}

/// `[database]` table of config.toml
#[derive(Debug, Default, Deserialize)]
pub struct DatabaseSection {
    /// Store connection target, e.g. `sqlite://products.db?mode=rwc`
    pub url: Option<String>,
}

impl AppConfig {
    /// Address the HTTP listener binds to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// Layers the values present in config.toml over the current settings.
    pub fn merge_file(&mut self, file: FileConfig) {
        if let Some(port) = file.server.port.filter(|p| !p.is_empty()) {
            self.port = port;
        }
        if let Some(url) = file.database.url.filter(|u| !u.is_empty()) {
            self.database_url = url;
        }
    }

    /// Layers environment values over the current settings.
    ///
    /// An empty `APP_PORT` counts as unset.
    pub fn merge_env(&mut self, app_port: Option<String>, database_url: Option<String>) {
        if let Some(port) = app_port.filter(|p| !p.is_empty()) {
            self.port = port;
        }
        if let Some(url) = database_url.filter(|u| !u.is_empty()) {
            self.database_url = url;
        }
    }
}

/// Parses a config.toml file.
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Resolves the application settings from defaults, config file and environment.
///
/// A missing default `config.toml` is fine; a file named explicitly through
/// `APP_CONFIG` must exist.
///
/// # Errors
/// Returns an error if an existing or explicitly requested config file cannot be loaded.
pub fn load_app_config() -> Result<AppConfig> {
    let mut config = AppConfig::default();

    let (path, explicit) = std::env::var("APP_CONFIG").map_or_else(
        |_| (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        |p| (PathBuf::from(p), true),
    );

    if explicit || path.exists() {
        config.merge_file(load_file(&path)?);
        info!("Loaded configuration file {}", path.display());
    } else {
        debug!("No configuration file at {}, using defaults", path.display());
    }

    config.merge_env(
        std::env::var("APP_PORT").ok(),
        std::env::var("DATABASE_URL").ok(),
    );

    Ok(config)
}
