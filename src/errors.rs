//! Unified error types for the license server.
//!
//! Every layer (store, authority, issuance, HTTP) reports failures through the
//! single [`Error`] enum so callers can match on the category of failure:
//! input, not-found, conflict, authorization, or storage fault.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A required request parameter was absent or blank.
    #[error("Missing required input: {field}")]
    MissingInput {
        /// Name of the missing parameter
        field: String,
    },

    /// A request parameter was present but unusable.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of what was wrong
        message: String,
    },

    /// No license exists for the supplied key.
    #[error("License not found: {key}")]
    LicenseNotFound {
        /// The key that was looked up
        key: String,
    },

    /// A license with this key already exists.
    #[error("License key already exists: {key}")]
    DuplicateKey {
        /// The colliding key
        key: String,
    },

    /// The HWID is already bound to a different license.
    #[error("HWID is already bound to another license: {hwid}")]
    HwidInUse {
        /// The colliding hardware identifier
        hwid: String,
    },

    /// The admin credential was missing or wrong.
    #[error("Unauthorized")]
    Unauthorized,

    /// A stored row could not be interpreted (bad date, unknown status).
    #[error("Corrupt license record {key}: {message}")]
    CorruptRecord {
        /// Key of the offending row
        key: String,
        /// What could not be parsed
        message: String,
    },

    /// Configuration could not be loaded.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Database error from `SeaORM`.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error (binding the listener, reading config files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// True for failures the caller caused and can fix by changing the request.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::MissingInput { .. } | Self::InvalidInput { .. })
    }

    /// True for persistence failures and unreadable stored data.
    #[must_use]
    pub const fn is_storage_fault(&self) -> bool {
        matches!(self, Self::Database(_) | Self::CorruptRecord { .. })
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
