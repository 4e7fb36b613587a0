//! MySQL adapter
//!
//! Create and drop run SQL over a fresh server connection; load and dump go
//! through the `mysql` and `mysqldump` clients.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use super::Adapter;
use crate::db::connection::Connection;
use crate::db::executor::ClientCommand;
use crate::error::{Error, Result};
use crate::utils::naming::format_sql_identifier;

pub struct MySqlAdapter<'a> {
    connection: &'a Connection,
    schema: PathBuf,
}

impl<'a> MySqlAdapter<'a> {
    pub fn new(connection: &'a Connection, schema: &Path) -> Self {
        Self {
            connection,
            schema: schema.to_path_buf(),
        }
    }

    /// A client command carrying the connection's credentials as flags
    fn command(&self, program: &str) -> ClientCommand {
        ClientCommand::new(program)
            .flag_opt("--user=", self.username())
            .flag_opt("--password=", self.password())
            .flag_opt("--host=", self.host())
            .flag_opt("--port=", self.port())
    }
}

fn database_name(adapter: &dyn Adapter) -> Result<String> {
    adapter.options().database.clone().ok_or_else(|| {
        Error::InvalidUri(format!("{} names no database", adapter.connection().uri()))
    })
}

/// Run a statement against the server, closing the connection afterwards
async fn run_on_server(adapter: &dyn Adapter, sql: &str) -> Result<()> {
    let server = adapter.new_connection().await?;
    let result = server.execute(sql).await;
    server.close().await;
    result
}

/// Turn a driver error into a migration error, rewriting its message when
/// `rewrite` recognizes it
fn migration_message(error: Error, rewrite: impl FnOnce(&str) -> Option<String>) -> Error {
    match error {
        Error::SqlxError(e) => {
            let message = e.to_string();
            Error::MigrationError(rewrite(&message).unwrap_or(message))
        }
        other => other,
    }
}

fn create_error(error: Error) -> Error {
    migration_message(error, |message| {
        message.contains("database exists").then(|| {
            "Database creation failed. There is 1 other session using the database".to_string()
        })
    })
}

fn drop_error(error: Error, name: &str) -> Error {
    migration_message(error, |message| {
        message
            .contains("doesn't exist")
            .then(|| format!("Cannot find database: {}", name))
    })
}

/// `CREATE DATABASE` over a fresh server connection
pub(super) async fn create_database(adapter: &dyn Adapter) -> Result<()> {
    let name = database_name(adapter)?;
    let sql = format!(
        "CREATE DATABASE {}",
        format_sql_identifier(&name, adapter.connection().database_type())
    );

    run_on_server(adapter, &sql).await.map_err(create_error)?;

    info!(database = %name, "Created MySQL database");
    Ok(())
}

/// `DROP DATABASE` over a fresh server connection
pub(super) async fn drop_database(adapter: &dyn Adapter) -> Result<()> {
    let name = database_name(adapter)?;
    let sql = format!(
        "DROP DATABASE {}",
        format_sql_identifier(&name, adapter.connection().database_type())
    );

    run_on_server(adapter, &sql)
        .await
        .map_err(|e| drop_error(e, &name))?;

    info!(database = %name, "Dropped MySQL database");
    Ok(())
}

#[async_trait]
impl Adapter for MySqlAdapter<'_> {
    fn connection(&self) -> &Connection {
        self.connection
    }

    fn schema(&self) -> &Path {
        &self.schema
    }

    async fn create(&self) -> Result<()> {
        create_database(self).await
    }

    async fn drop(&self) -> Result<()> {
        drop_database(self).await
    }

    async fn load(&self) -> Result<()> {
        if !tokio::fs::try_exists(&self.schema).await? {
            return Ok(());
        }

        self.command("mysql")
            .word_opt(self.database())
            .stdin_from(&self.schema)
            .run()
            .await
            .map_err(|e| match e {
                Error::MigrationError(message) => Error::MigrationError(format!(
                    "Can't load schema {}: {}",
                    self.schema.display(),
                    message
                )),
                other => other,
            })?;

        info!(schema = %self.schema.display(), "Loaded schema");
        Ok(())
    }

    async fn dump(&self) -> Result<()> {
        let database = self.database().ok_or_else(|| {
            Error::InvalidUri(format!("{} names no database", self.connection.uri()))
        })?;
        let ignore = format!("{}.{}", database, self.migrations_table());

        self.command("mysqldump")
            .word("--no-data")
            .word("--skip-comments")
            .flag_opt("--ignore-table=", Some(ignore))
            .word(database.clone())
            .stdout_to(&self.schema)
            .run()
            .await?;

        self.command("mysqldump")
            .word("--no-create-info")
            .word("--skip-comments")
            .word(database)
            .word(self.migrations_table())
            .append_to(&self.schema)
            .run()
            .await?;

        info!(schema = %self.schema.display(), "Dumped schema");
        Ok(())
    }
}
