//! Migration bookkeeping
//!
//! Applied migrations are recorded one row per file in `schema_migrations`,
//! keyed by a `filename` that starts with a `YYYYMMDDHHMMSS` timestamp.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::db::connection::DatabaseConnection;
use crate::error::Result;

/// Table that stores applied migrations
pub const MIGRATIONS_TABLE: &str = "schema_migrations";

/// Column of the migrations table holding the migration filename
pub const MIGRATIONS_TABLE_VERSION_COLUMN: &str = "filename";

static VERSION_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A[0-9]{14}").expect("version prefix pattern is valid"));

/// Extract the 14 digit timestamp a migration filename starts with.
///
/// A filename without that prefix yields an empty string rather than an
/// error; callers read `""` as "no discoverable version".
pub fn extract_version(filename: &str) -> String {
    VERSION_PREFIX
        .find(filename)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Check whether a table exists in the connected database
pub async fn table_exists(connection: &DatabaseConnection, table_name: &str) -> Result<bool> {
    let count: i64 = match connection {
        DatabaseConnection::Postgres(pool) => {
            sqlx::query_scalar(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = current_schema() AND table_name = $1",
            )
            .bind(table_name)
            .fetch_one(pool)
            .await?
        }
        DatabaseConnection::MySql(pool) => {
            sqlx::query_scalar(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = DATABASE() AND table_name = ?",
            )
            .bind(table_name)
            .fetch_one(pool)
            .await?
        }
        DatabaseConnection::Sqlite(pool) => {
            sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(table_name)
                .fetch_one(pool)
                .await?
        }
    };

    Ok(count > 0)
}

/// Fetch the filename of the last applied migration, ordered by filename
pub async fn latest_migration(connection: &DatabaseConnection) -> Result<Option<String>> {
    let sql = format!(
        "SELECT {column} FROM {table} ORDER BY {column} DESC LIMIT 1",
        column = MIGRATIONS_TABLE_VERSION_COLUMN,
        table = MIGRATIONS_TABLE,
    );

    let filename = match connection {
        DatabaseConnection::Postgres(pool) => {
            sqlx::query_scalar::<_, String>(&sql).fetch_optional(pool).await?
        }
        DatabaseConnection::MySql(pool) => {
            sqlx::query_scalar::<_, String>(&sql).fetch_optional(pool).await?
        }
        DatabaseConnection::Sqlite(pool) => {
            sqlx::query_scalar::<_, String>(&sql).fetch_optional(pool).await?
        }
    };

    Ok(filename)
}

/// Resolve the current version of the connected database.
///
/// `None` when the migrations table is missing or empty.
pub async fn current_version(connection: &DatabaseConnection) -> Result<Option<String>> {
    if !table_exists(connection, MIGRATIONS_TABLE).await? {
        tracing::debug!(table = MIGRATIONS_TABLE, "Migrations table not found");
        return Ok(None);
    }

    let version = latest_migration(connection)
        .await?
        .map(|filename| extract_version(&filename));

    tracing::debug!(version = ?version, "Resolved database version");
    Ok(version)
}
