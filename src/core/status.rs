//! License status values as stored in the `status` column.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Administrative status of a license.
///
/// Only `Valid -> Banned` is ever written; there is no path back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LicenseStatus {
    /// Usable, subject to expiry and HWID checks
    Valid,
    /// Revoked by an administrator
    Banned,
}

impl LicenseStatus {
    /// The literal stored in the database and returned on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "VALID",
            Self::Banned => "BANNED",
        }
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseStatus {
    type Err = Error;

    /// Case-insensitive, so list filters can be typed in any case.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VALID" => Ok(Self::Valid),
            "BANNED" => Ok(Self::Banned),
            other => Err(Error::InvalidInput {
                message: format!("unknown license status '{other}'"),
            }),
        }
    }
}
