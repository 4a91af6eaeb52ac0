//! Administrative operations and the capability gate that protects them.
//!
//! Every admin entry point calls [`require_admin`] before it touches the store,
//! so a rejected credential never leaves a partial mutation behind.

use crate::{
    core::{
        status::LicenseStatus,
        store::{self, StatusUpdate},
    },
    errors::{Error, Result},
};
use sea_orm::ConnectionTrait;
use tracing::{info, instrument, warn};

/// Decides whether a credential grants administrative access.
pub trait AdminGate: Send + Sync {
    /// True if `credential` is an admin credential.
    fn is_admin(&self, credential: Option<&str>) -> bool;
}

/// Compares credentials against one shared secret.
///
/// An empty configured token never matches.
#[derive(Clone)]
pub struct StaticTokenGate {
    token: String,
}

impl StaticTokenGate {
    /// Create a gate for `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticTokenGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenGate")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl AdminGate for StaticTokenGate {
    fn is_admin(&self, credential: Option<&str>) -> bool {
        match credential {
            Some(given) => !self.token.is_empty() && given == self.token,
            None => false,
        }
    }
}

/// Fails with `Error::Unauthorized` unless `credential` passes `gate`.
pub fn require_admin<G>(gate: &G, credential: Option<&str>) -> Result<()>
where
    G: AdminGate + ?Sized,
{
    if gate.is_admin(credential) {
        Ok(())
    } else {
        warn!(
            credential_present = credential.is_some(),
            "Rejected admin request"
        );
        Err(Error::Unauthorized)
    }
}

/// Marks a license `BANNED`. Banning an already banned license succeeds.
///
/// The reason is only logged; the data model has no place for it. There is no
/// way to lift a ban.
///
/// # Errors
/// * `Error::MissingInput` if `key` is blank
/// * `Error::LicenseNotFound` if no such license exists
#[instrument(skip(db))]
pub async fn ban_license<C>(db: &C, key: &str, reason: Option<&str>) -> Result<()>
where
    C: ConnectionTrait,
{
    if key.trim().is_empty() {
        return Err(Error::MissingInput {
            field: "key".to_string(),
        });
    }

    match store::set_status(db, key, LicenseStatus::Banned).await? {
        StatusUpdate::Updated => {
            info!(reason = reason.unwrap_or("none given"), "Banned license");
            Ok(())
        }
        StatusUpdate::NotFound => Err(Error::LicenseNotFound {
            key: key.to_string(),
        }),
    }
}
