//! Native console invocations
//!
//! Each console turns a parsed connection URI into the command line of the
//! dialect's interactive client. Segments always come in the order host,
//! database, port, username, password; absent values drop their segment and
//! present ones are shell-escaped.

pub mod jdbc_mysql;
pub mod mysql;
pub mod postgresql;
pub mod sqlite;

pub use jdbc_mysql::JdbcMysql;
pub use mysql::Mysql;
pub use postgresql::Postgresql;
pub use sqlite::Sqlite;

use crate::db::connection::{ConnectionUri, DatabaseType};
use crate::utils::shell;

/// A dialect's console command builder
pub trait Console {
    /// The command line that starts the console
    fn connection_string(&self) -> String;

    /// Environment the console needs but which must stay off the command line
    fn envs(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// Select the console for a dialect. Dialects without a native console get `None`.
pub fn for_uri<'a>(
    database_type: &DatabaseType,
    uri: &'a ConnectionUri,
) -> Option<Box<dyn Console + 'a>> {
    match database_type {
        DatabaseType::Sqlite => Some(Box::new(Sqlite::new(uri))),
        DatabaseType::Postgres => Some(Box::new(Postgresql::new(uri))),
        DatabaseType::Mysql => Some(Box::new(Mysql::new(uri))),
        DatabaseType::JdbcMysql => Some(Box::new(JdbcMysql::new(uri))),
        DatabaseType::Other(_) => None,
    }
}

/// ` <flag> <escaped value>`, or nothing when the value is absent
fn segment(flag: &str, value: Option<&str>) -> String {
    value
        .map(|v| format!(" {} {}", flag, shell::escape(v)))
        .unwrap_or_default()
}
