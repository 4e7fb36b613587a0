//! Identifier quoting for the SQL statements adapters issue themselves

use crate::db::connection::DatabaseType;

/// Quote an identifier for the given dialect, doubling any embedded quote
/// character
pub fn format_sql_identifier(name: &str, database_type: &DatabaseType) -> String {
    match database_type {
        DatabaseType::Mysql | DatabaseType::JdbcMysql => {
            format!("`{}`", name.replace('`', "``"))
        }
        DatabaseType::Postgres | DatabaseType::Sqlite => {
            format!("\"{}\"", name.replace('"', "\"\""))
        }
        DatabaseType::Other(_) => name.to_string(),
    }
}
