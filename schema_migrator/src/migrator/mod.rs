//! Migrator adapters
//!
//! An adapter binds one [`Connection`] to the dialect specific way of
//! creating, dropping, loading and dumping its database. Verbs a dialect does
//! not implement fail with a `MigrationError` naming the dialect and the verb.

pub mod base;
pub mod jdbc_mysql;
pub mod mysql;
pub mod postgres;
pub mod sqlite;

pub use base::BaseAdapter;
pub use jdbc_mysql::JdbcMySqlAdapter;
pub use mysql::MySqlAdapter;
pub use postgres::PostgresAdapter;
pub use sqlite::SqliteAdapter;

use std::path::Path;

use async_trait::async_trait;

use crate::db::connection::{
    driver_url, Connection, ConnectionOptions, DatabaseConnection, DatabaseType,
};
use crate::db::migrations::{self, MIGRATIONS_TABLE};
use crate::error::{Error, Result};
use crate::utils::shell;

/// Operations every dialect adapter exposes
#[async_trait]
pub trait Adapter: Send + Sync {
    /// The connection this adapter is bound to
    fn connection(&self) -> &Connection;

    /// Schema dump file read by `load` and written by `dump`
    fn schema(&self) -> &Path;

    /// Create the database named by the connection
    async fn create(&self) -> Result<()> {
        Err(self.unsupported("create"))
    }

    /// Drop the database named by the connection
    async fn drop(&self) -> Result<()> {
        Err(self.unsupported("drop"))
    }

    /// Load the schema dump into the database
    async fn load(&self) -> Result<()> {
        Err(self.unsupported("load"))
    }

    /// Dump the database structure and applied migrations into the schema file
    async fn dump(&self) -> Result<()> {
        Err(self.unsupported("dump"))
    }

    /// The timestamp of the last applied migration.
    ///
    /// `None` without a handle or without a migrations table. `Some("")` when
    /// the last filename does not start with a timestamp.
    async fn version(&self) -> Result<Option<String>> {
        match self.connection().handle() {
            Some(handle) => migrations::current_version(handle).await,
            None => Ok(None),
        }
    }

    fn unsupported(&self, verb: &str) -> Error {
        Error::MigrationError(format!(
            "Current adapter ({}) doesn't support {}.",
            self.connection().database_type(),
            verb
        ))
    }

    fn options(&self) -> &ConnectionOptions {
        self.connection().options()
    }

    fn database(&self) -> Option<String> {
        shell::escape_option(self.options().database.as_deref())
    }

    fn host(&self) -> Option<String> {
        shell::escape_option(self.options().host.as_deref())
    }

    fn port(&self) -> Option<String> {
        shell::escape_option(self.options().port.as_deref())
    }

    fn username(&self) -> Option<String> {
        shell::escape_option(self.options().user.as_deref())
    }

    fn password(&self) -> Option<String> {
        shell::escape_option(self.options().password.as_deref())
    }

    fn migrations_table(&self) -> String {
        shell::escape(MIGRATIONS_TABLE)
    }

    /// Open a bare connection to the server, without naming a database.
    ///
    /// Create and drop go through this because the database they target does
    /// not exist yet, or is about to go away.
    async fn new_connection(&self) -> Result<DatabaseConnection> {
        let connection = self.connection();
        let server_uri = connection.parsed_uri().server_uri()?;
        let url = driver_url(&server_uri, connection.database_type())?;

        DatabaseConnection::connect(connection.database_type(), &url).await
    }
}

/// The adapter selected for a connection
pub enum DialectAdapter<'a> {
    Sqlite(SqliteAdapter<'a>),
    Postgres(PostgresAdapter<'a>),
    MySql(MySqlAdapter<'a>),
    JdbcMySql(JdbcMySqlAdapter<'a>),
    Base(BaseAdapter<'a>),
}

/// Select the adapter for a connection's dialect. Unknown dialects get the
/// base adapter, which supports nothing but `version`.
pub fn for_connection<'a>(connection: &'a Connection, schema: &Path) -> DialectAdapter<'a> {
    match connection.database_type() {
        DatabaseType::Sqlite => DialectAdapter::Sqlite(SqliteAdapter::new(connection, schema)),
        DatabaseType::Postgres => DialectAdapter::Postgres(PostgresAdapter::new(connection, schema)),
        DatabaseType::Mysql => DialectAdapter::MySql(MySqlAdapter::new(connection, schema)),
        DatabaseType::JdbcMysql => {
            DialectAdapter::JdbcMySql(JdbcMySqlAdapter::new(connection, schema))
        }
        DatabaseType::Other(_) => DialectAdapter::Base(BaseAdapter::new(connection, schema)),
    }
}

impl<'a> DialectAdapter<'a> {
    fn as_adapter(&self) -> &(dyn Adapter + 'a) {
        match self {
            DialectAdapter::Sqlite(adapter) => adapter,
            DialectAdapter::Postgres(adapter) => adapter,
            DialectAdapter::MySql(adapter) => adapter,
            DialectAdapter::JdbcMySql(adapter) => adapter,
            DialectAdapter::Base(adapter) => adapter,
        }
    }

    /// Name of the selected implementation
    pub fn dialect_name(&self) -> &'static str {
        match self {
            DialectAdapter::Sqlite(_) => "sqlite",
            DialectAdapter::Postgres(_) => "postgres",
            DialectAdapter::MySql(_) => "mysql",
            DialectAdapter::JdbcMySql(_) => "jdbc_mysql",
            DialectAdapter::Base(_) => "base",
        }
    }

    pub async fn create(&self) -> Result<()> {
        self.as_adapter().create().await
    }

    pub async fn drop(&self) -> Result<()> {
        self.as_adapter().drop().await
    }

    pub async fn load(&self) -> Result<()> {
        self.as_adapter().load().await
    }

    pub async fn dump(&self) -> Result<()> {
        self.as_adapter().dump().await
    }

    pub async fn version(&self) -> Result<Option<String>> {
        self.as_adapter().version().await
    }
}
