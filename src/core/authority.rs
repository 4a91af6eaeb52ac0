//! License authority - the verification state machine.
//!
//! A verification reads one row, optionally performs the first-use HWID bind,
//! and derives a [`Verdict`]. Checks run in a fixed order and the first match
//! wins:
//!
//! 1. missing key parameter → [`Verdict::MissingKey`]
//! 2. no such license → [`Verdict::Invalid`]
//! 3. bound HWID differs from the supplied one → [`Verdict::HwidMismatch`]
//! 4. status other than `VALID` → [`Verdict::Inactive`]
//! 5. past the expiration date → [`Verdict::Expired`]
//! 6. otherwise → [`Verdict::Valid`]
//!
//! Expiration is recomputed from the stored date on every call.

use crate::{
    core::{
        clock::Clock,
        status::LicenseStatus,
        store::{self, BindOutcome, DATE_FORMAT},
    },
    entities::license,
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::ConnectionTrait;
use tracing::{debug, instrument, warn};

/// Outcome of a verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// No key was supplied
    MissingKey,
    /// The key does not exist
    Invalid,
    /// The license is bound to a different machine
    HwidMismatch,
    /// The license has a non-`VALID` status, e.g. banned
    Inactive(LicenseStatus),
    /// The license ran out
    Expired,
    /// The license is usable
    Valid {
        /// Last usable day
        expire: NaiveDate,
        /// Days remaining, `0` on the last valid day
        days_left: i64,
        /// The bound HWID, if any
        hwid: Option<String>,
    },
}

impl Verdict {
    /// The status literal reported to clients.
    #[must_use]
    pub const fn status_literal(&self) -> &'static str {
        match self {
            Self::MissingKey => "MISSING_KEY",
            Self::Invalid => "INVALID",
            Self::HwidMismatch => "HWID_MISMATCH",
            Self::Inactive(status) => status.as_str(),
            Self::Expired => "EXPIRED",
            Self::Valid { .. } => "VALID",
        }
    }

    /// Whether the license may be used.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}

/// Verifies `key`, binding `hwid` to it on first use.
///
/// Blank `key` or `hwid` values count as absent. Keys are matched exactly,
/// surrounding whitespace included. The bind only happens for `VALID` licenses
/// that have no HWID yet and whose row parses cleanly. If another request binds
/// first, the row is read again and evaluated against the winner's HWID. An
/// HWID already bound to a different license leaves this one unbound and
/// yields [`Verdict::HwidMismatch`].
///
/// # Errors
/// * `Error::CorruptRecord` if the stored status or date cannot be parsed
/// * `Error::Database` on persistence failures
#[instrument(skip(db, clock))]
pub async fn verify_license<C, K>(
    db: &C,
    clock: &K,
    key: Option<&str>,
    hwid: Option<&str>,
) -> Result<Verdict>
where
    C: ConnectionTrait,
    K: Clock + ?Sized,
{
    let Some(key) = key.filter(|k| !k.trim().is_empty()) else {
        return Ok(Verdict::MissingKey);
    };
    let requested_hwid = non_blank(hwid);

    let Some(mut license) = store::get_license(db, key).await? else {
        debug!("Unknown license key");
        return Ok(Verdict::Invalid);
    };

    if let Some(requested) = requested_hwid {
        if license.bound_hwid().is_none() && parse_status(&license)? == LicenseStatus::Valid {
            // A row that cannot be evaluated must not be written to.
            parse_expire_date(&license)?;

            match store::bind_hwid(db, key, requested).await {
                Ok(BindOutcome::Bound) => license.hwid = Some(requested.to_string()),
                Ok(BindOutcome::AlreadyBound) => {
                    warn!("Lost HWID bind race, re-reading license");
                    match store::get_license(db, key).await? {
                        Some(current) => license = current,
                        None => return Ok(Verdict::Invalid),
                    }
                }
                Ok(BindOutcome::NotFound) => return Ok(Verdict::Invalid),
                Err(Error::HwidInUse { .. }) => {
                    warn!("HWID already bound to another license");
                    return Ok(Verdict::HwidMismatch);
                }
                Err(e) => return Err(e),
            }
        }
    }

    let verdict = evaluate(&license, requested_hwid, clock.today())?;
    debug!(status = verdict.status_literal(), "Verification complete");
    Ok(verdict)
}

/// Applies checks 3 to 6 to a license row without touching the store.
///
/// # Errors
/// `Error::CorruptRecord` if the stored status or date cannot be parsed.
pub fn evaluate(
    license: &license::Model,
    requested_hwid: Option<&str>,
    today: NaiveDate,
) -> Result<Verdict> {
    if let (Some(bound), Some(requested)) = (license.bound_hwid(), non_blank(requested_hwid)) {
        if !bound.eq_ignore_ascii_case(requested) {
            return Ok(Verdict::HwidMismatch);
        }
    }

    let status = parse_status(license)?;
    if status != LicenseStatus::Valid {
        return Ok(Verdict::Inactive(status));
    }

    let expire = parse_expire_date(license)?;
    let days_left = (expire - today).num_days();
    if days_left < 0 {
        return Ok(Verdict::Expired);
    }

    Ok(Verdict::Valid {
        expire,
        days_left,
        hwid: license.bound_hwid().map(str::to_string),
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_status(license: &license::Model) -> Result<LicenseStatus> {
    license
        .status
        .parse()
        .map_err(|_| Error::CorruptRecord {
            key: license.key.clone(),
            message: format!("unrecognized status '{}'", license.status),
        })
}

fn parse_expire_date(license: &license::Model) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&license.expire_date, DATE_FORMAT).map_err(|e| {
        Error::CorruptRecord {
            key: license.key.clone(),
            message: format!("bad expire_date '{}': {e}", license.expire_date),
        }
    })
}
