//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! The `licenses` table is generated from the entity definition with
//! `Schema::create_table_from_entity`; the partial unique index on bound HWIDs
//! has no `SeaQuery` equivalent and is issued as raw SQL.

use crate::entities::License;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info, instrument};

/// Fallback connection string when neither config file nor environment sets one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://licenses.sqlite?mode=rwc";

/// HWIDs compare ignoring ASCII case, so uniqueness is enforced on `lower(hwid)`.
/// `SQLite` reports violations as `index 'idx_licenses_hwid_nocase'`.
const CREATE_HWID_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS idx_licenses_hwid_nocase \
     ON licenses(lower(hwid)) WHERE hwid IS NOT NULL AND hwid <> ''";

/// Case-sensitive index from earlier schema versions.
const DROP_LEGACY_HWID_INDEX: &str = "DROP INDEX IF EXISTS idx_licenses_hwid";

/// Opens a connection to `database_url` and makes sure the schema exists.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database");
    let db = Database::connect(database_url).await?;
    create_tables(&db).await?;
    info!("Database connection ready");
    Ok(db)
}

/// Creates the `licenses` table and its HWID uniqueness index if they do not exist.
///
/// Safe to call on every startup.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut license_table = schema.create_table_from_entity(License);
    license_table.if_not_exists();

    db.execute(builder.build(&license_table)).await?;
    db.execute_unprepared(DROP_LEGACY_HWID_INDEX).await?;
    db.execute_unprepared(CREATE_HWID_INDEX).await?;

    debug!("Ensured licenses table and HWID index");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{LicenseModel, license};
    use chrono::Utc;
    use sea_orm::{ActiveModelTrait, EntityTrait, QuerySelect, Set};

    fn row(key: &str, hwid: Option<&str>) -> license::ActiveModel {
        license::ActiveModel {
            key: Set(key.to_string()),
            owner: Set("owner".to_string()),
            hwid: Set(hwid.map(str::to_string)),
            status: Set("VALID".to_string()),
            expire_date: Set("2030-01-01".to_string()),
            created_at: Set(Utc::now()),
        }
    }

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let _: Vec<LicenseModel> = License::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;

        let _: Vec<LicenseModel> = License::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_hwid_index_ignores_case() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        row("K1", Some("ABC-def")).insert(&db).await?;
        assert!(row("K2", Some("abc-DEF")).insert(&db).await.is_err());

        // Unbound rows are not constrained.
        row("K3", None).insert(&db).await?;
        row("K4", None).insert(&db).await?;
        row("K5", Some("")).insert(&db).await?;
        row("K6", Some("")).insert(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_connection_memory() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;
        let _: Vec<LicenseModel> = License::find().limit(1).all(&db).await?;
        Ok(())
    }
}
