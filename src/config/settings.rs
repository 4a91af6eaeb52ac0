//! Application settings loaded from `license.toml` and the environment.
//!
//! The TOML file is optional and every key in it is optional. Environment
//! variables (including those loaded from `.env`) override file values.

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Default config file location, overridable with `LICENSE_CONFIG`.
pub const DEFAULT_CONFIG_PATH: &str = "license.toml";

/// Validity period for newly issued keys when the request gives none.
pub const DEFAULT_LICENSE_DAYS: i64 = 30;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 10000;

/// Structure of the optional `license.toml` file
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    /// `SeaORM` connection string
    pub database_url: Option<String>,
    /// Shared secret for admin operations
    pub admin_token: Option<String>,
    /// Default validity period in days
    pub default_days: Option<i64>,
    /// Interface to bind
    pub host: Option<String>,
    /// Port to bind
    pub port: Option<u16>,
}

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `SeaORM` connection string
    pub database_url: String,
    /// Shared secret for admin operations
    pub admin_token: String,
    /// Default validity period in days
    pub default_days: i64,
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
}

impl AppConfig {
    /// Socket address string for the HTTP listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Merges file values with overrides looked up through `env`.
    ///
    /// `env` is injected so the merge can be tested without touching the
    /// process environment.
    pub fn from_sources<F>(file: FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = env("DATABASE_URL")
            .or(file.database_url)
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let admin_token = env("ADMIN_TOKEN")
            .or(file.admin_token)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Config {
                message: "ADMIN_TOKEN must be set in the environment or license.toml".to_string(),
            })?;

        let default_days = match env("DEFAULT_DAYS") {
            Some(raw) => raw.trim().parse::<i64>().map_err(|e| Error::Config {
                message: format!("DEFAULT_DAYS is not a number: {e}"),
            })?,
            None => file.default_days.unwrap_or(DEFAULT_LICENSE_DAYS),
        };
        if default_days < 0 {
            return Err(Error::Config {
                message: format!("default_days must not be negative, got {default_days}"),
            });
        }

        let host = env("HOST")
            .or(file.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match env("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| Error::Config {
                message: format!("PORT is not a valid port: {e}"),
            })?,
            None => file.port.unwrap_or(DEFAULT_PORT),
        };

        Ok(Self {
            database_url,
            admin_token,
            default_days,
            host,
            port,
        })
    }
}

/// Parses a `license.toml` file.
///
/// # Errors
/// Returns `Error::Config` if the file cannot be read or is not valid TOML.
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads the application configuration from the default sources.
///
/// A missing config file is not an error; a malformed one is.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("LICENSE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let file = if Path::new(&path).exists() {
        info!("Loading configuration file {}", path);
        load_config_file(&path)?
    } else {
        warn!("No configuration file at {}, using environment only", path);
        FileConfig::default()
    };

    AppConfig::from_sources(file, |name| std::env::var(name).ok())
}
