/// Database connection and schema creation
pub mod database;

/// Application settings from license.toml and environment variables
pub mod settings;

pub use settings::{AppConfig, load_app_configuration};
