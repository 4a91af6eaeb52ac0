//! License store - point lookups and single-row conditional updates.
//!
//! This module is the only code that talks to the `licenses` table. There is no
//! in-memory cache: every call reflects the latest committed row. All functions
//! are generic over `ConnectionTrait` so they run on a plain connection or
//! inside a transaction.
//!
//! The HWID bind is a single `UPDATE ... WHERE hwid IS NULL OR hwid = ''`, so
//! two racing first-use requests cannot both bind. The loser sees zero affected
//! rows and gets [`BindOutcome::AlreadyBound`].

use crate::{
    core::status::LicenseStatus,
    entities::{License, license},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    Condition, QueryOrder, Set, SqlErr,
    prelude::*,
    sea_query::Expr,
};
use tracing::{debug, info, instrument};

/// Date format of the `expire_date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Everything needed to insert a new license row.
#[derive(Debug, Clone)]
pub struct NewLicense {
    /// Unique license key
    pub key: String,
    /// Owner label
    pub owner: String,
    /// Optional pre-bound HWID
    pub hwid: Option<String>,
    /// Last usable day
    pub expire_date: NaiveDate,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Result of a conditional HWID bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// The row had no HWID and now holds the supplied one
    Bound,
    /// The row already had an HWID; nothing was written
    AlreadyBound,
    /// No row with this key
    NotFound,
}

/// Result of a status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The row now has the requested status
    Updated,
    /// No row with this key
    NotFound,
}

/// Optional filters for [`list_licenses`].
#[derive(Debug, Clone, Default)]
pub struct LicenseFilter {
    /// Only licenses with this status
    pub status: Option<LicenseStatus>,
    /// Only licenses with exactly this owner label
    pub owner: Option<String>,
}

/// Looks up a license by key.
#[instrument(skip(db))]
pub async fn get_license<C>(db: &C, key: &str) -> Result<Option<license::Model>>
where
    C: ConnectionTrait,
{
    let found = License::find_by_id(key.to_string()).one(db).await?;
    debug!(found = found.is_some(), "License lookup");
    Ok(found)
}

/// Inserts a new license with status `VALID`.
///
/// # Errors
/// * `Error::DuplicateKey` if the key already exists
/// * `Error::HwidInUse` if the pre-bound HWID belongs to another license
#[instrument(skip(db, new_license), fields(key = %new_license.key))]
pub async fn create_license<C>(db: &C, new_license: NewLicense) -> Result<license::Model>
where
    C: ConnectionTrait,
{
    let NewLicense {
        key,
        owner,
        hwid,
        expire_date,
        created_at,
    } = new_license;
    let hwid = hwid.filter(|h| !h.trim().is_empty());

    let active = license::ActiveModel {
        key: Set(key.clone()),
        owner: Set(owner),
        hwid: Set(hwid.clone()),
        status: Set(LicenseStatus::Valid.as_str().to_string()),
        expire_date: Set(expire_date.format(DATE_FORMAT).to_string()),
        created_at: Set(created_at),
    };

    let model = active
        .insert(db)
        .await
        .map_err(|e| classify_unique_violation(e, &key, hwid.as_deref()))?;

    info!(expire = %model.expire_date, "Created license");
    Ok(model)
}

/// Binds `hwid` to the license if, and only if, it has no HWID yet.
///
/// The check and the write happen in one statement against the stored row.
///
/// # Errors
/// `Error::HwidInUse` if `hwid` is already bound to a different license.
#[instrument(skip(db))]
pub async fn bind_hwid<C>(db: &C, key: &str, hwid: &str) -> Result<BindOutcome>
where
    C: ConnectionTrait,
{
    let result = License::update_many()
        .col_expr(license::Column::Hwid, Expr::value(hwid.to_string()))
        .filter(license::Column::Key.eq(key))
        .filter(
            Condition::any()
                .add(license::Column::Hwid.is_null())
                .add(license::Column::Hwid.eq("")),
        )
        .exec(db)
        .await
        .map_err(|e| classify_unique_violation(e, key, Some(hwid)))?;

    if result.rows_affected > 0 {
        info!("Bound HWID to license");
        return Ok(BindOutcome::Bound);
    }

    if get_license(db, key).await?.is_some() {
        debug!("License already bound, conditional update skipped");
        Ok(BindOutcome::AlreadyBound)
    } else {
        Ok(BindOutcome::NotFound)
    }
}

/// Sets the status of a license. Setting the current status again succeeds.
#[instrument(skip(db))]
pub async fn set_status<C>(db: &C, key: &str, status: LicenseStatus) -> Result<StatusUpdate>
where
    C: ConnectionTrait,
{
    let result = License::update_many()
        .col_expr(license::Column::Status, Expr::value(status.as_str()))
        .filter(license::Column::Key.eq(key))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        info!(%status, "Updated license status");
        return Ok(StatusUpdate::Updated);
    }

    // Some backends report zero rows when the value did not change.
    if get_license(db, key).await?.is_some() {
        Ok(StatusUpdate::Updated)
    } else {
        Ok(StatusUpdate::NotFound)
    }
}

/// Lists licenses matching `filter`, newest first.
#[instrument(skip(db))]
pub async fn list_licenses<C>(db: &C, filter: &LicenseFilter) -> Result<Vec<license::Model>>
where
    C: ConnectionTrait,
{
    let mut query = License::find();
    if let Some(status) = filter.status {
        query = query.filter(license::Column::Status.eq(status.as_str()));
    }
    if let Some(owner) = &filter.owner {
        query = query.filter(license::Column::Owner.eq(owner.as_str()));
    }

    let licenses = query
        .order_by_desc(license::Column::CreatedAt)
        .order_by_asc(license::Column::Key)
        .all(db)
        .await?;

    debug!("Fetched {} licenses", licenses.len());
    Ok(licenses)
}

/// Deletes every license. Returns how many rows were removed.
#[instrument(skip(db))]
pub async fn reset_licenses<C>(db: &C) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = License::delete_many().exec(db).await?;
    info!("Reset license store, removed {} licenses", result.rows_affected);
    Ok(result.rows_affected)
}

/// Maps unique-constraint failures to the matching conflict error.
///
/// `SQLite` names the violated column in the message
/// (`UNIQUE constraint failed: licenses.hwid`).
fn classify_unique_violation(err: DbErr, key: &str, hwid: Option<&str>) -> Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) if message.contains("hwid") => {
            Error::HwidInUse {
                hwid: hwid.unwrap_or_default().to_string(),
            }
        }
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::DuplicateKey {
            key: key.to_string(),
        },
        _ => Error::Database(err),
    }
}
