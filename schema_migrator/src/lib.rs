//! schema_migrator: database lifecycle adapters for an ORM's migrator
//!
//! Given a connection, schema_migrator picks the adapter for its dialect and
//! creates, drops, loads or dumps the database, or reports the version of the
//! last applied migration. Dialects that need a native client get a shell
//! command line with every interpolated value escaped.

pub mod config;
pub mod consoles;
pub mod db;
pub mod error;
pub mod migrator;
pub mod utils;

// Re-export main types for easier access
pub use config::Config;
pub use consoles::Console;
pub use db::connection::{Connection, ConnectionUri, DatabaseConnection, DatabaseType};
pub use error::{Error, Result};
pub use migrator::{for_connection, Adapter, DialectAdapter};

/// Initialize a migrator with the specified configuration file
pub fn init(config_path: &str) -> Result<Migrator> {
    let config = config::load_from_file(config_path)?;
    Migrator::new(config)
}

/// The main client for running database lifecycle commands
pub struct Migrator {
    config: Config,
    connection: Connection,
}

impl Migrator {
    /// Create a migrator from configuration. The pool connects lazily, so the
    /// database does not have to exist yet.
    pub fn new(config: Config) -> Result<Self> {
        let connection = Connection::open(&config.database)?;
        Ok(Self { config, connection })
    }

    /// Create a migrator around an existing connection
    pub fn with_connection(config: Config, connection: Connection) -> Self {
        Self { config, connection }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// The adapter for the configured dialect
    pub fn adapter(&self) -> DialectAdapter<'_> {
        migrator::for_connection(&self.connection, &self.config.migrations.schema)
    }

    /// The native console for the configured dialect, if it has one
    pub fn console(&self) -> Option<Box<dyn Console + '_>> {
        consoles::for_uri(
            self.connection.database_type(),
            self.connection.parsed_uri(),
        )
    }

    pub async fn create(&self) -> Result<()> {
        self.adapter().create().await
    }

    pub async fn drop(&self) -> Result<()> {
        self.adapter().drop().await
    }

    pub async fn load(&self) -> Result<()> {
        self.adapter().load().await
    }

    pub async fn dump(&self) -> Result<()> {
        self.adapter().dump().await
    }

    pub async fn version(&self) -> Result<Option<String>> {
        self.adapter().version().await
    }

    /// Recreate the database from the schema dump: drop it if present,
    /// create it, then load the schema
    pub async fn prepare(&self) -> Result<()> {
        let adapter = self.adapter();

        if let Err(e) = adapter.drop().await {
            tracing::debug!(error = %e, "Ignoring drop failure while preparing");
        }
        adapter.create().await?;
        adapter.load().await?;

        tracing::info!(
            database_type = %self.connection.database_type(),
            "Database prepared"
        );
        Ok(())
    }
}
