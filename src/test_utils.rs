//! Shared test utilities.
//!
//! Helpers for setting up in-memory databases, a fixed clock, and license rows
//! with sensible defaults.

use crate::{
    core::{
        clock::{Clock, FixedClock},
        store::{self, NewLicense},
    },
    entities::license,
    errors::Result,
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber once; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with the schema initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// The date every test runs on.
#[must_use]
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap_or_default()
}

/// A clock frozen on [`test_today`].
#[must_use]
pub fn test_clock() -> FixedClock {
    FixedClock::on_date(test_today())
}

/// The instant [`test_clock`] reports.
#[must_use]
pub fn test_now() -> DateTime<Utc> {
    test_clock().now_utc()
}

/// Creates a `VALID` license owned by `"test_owner"` through the store.
pub async fn create_test_license(
    db: &DatabaseConnection,
    key: &str,
    hwid: Option<&str>,
    expire_date: NaiveDate,
) -> Result<license::Model> {
    store::create_license(
        db,
        NewLicense {
            key: key.to_string(),
            owner: "test_owner".to_string(),
            hwid: hwid.map(str::to_string),
            expire_date,
            created_at: test_now(),
        },
    )
    .await
}

/// Inserts a row verbatim, bypassing validation, to simulate odd stored data.
pub async fn insert_raw_license(
    db: &DatabaseConnection,
    key: &str,
    hwid: Option<&str>,
    status: &str,
    expire_date: &str,
) -> Result<license::Model> {
    let row = license::ActiveModel {
        key: Set(key.to_string()),
        owner: Set("test_owner".to_string()),
        hwid: Set(hwid.map(str::to_string)),
        status: Set(status.to_string()),
        expire_date: Set(expire_date.to_string()),
        created_at: Set(test_now()),
    };
    Ok(row.insert(db).await?)
}
