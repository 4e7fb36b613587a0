//! Database module for the migrator
//!
//! Connection descriptors, the migrations table and native client execution.

pub mod connection;
pub mod executor;
pub mod migrations;

// Re-export key types
pub use connection::{Connection, ConnectionOptions, ConnectionUri, DatabaseConnection, DatabaseType};
pub use executor::ClientCommand;
pub use migrations::{MIGRATIONS_TABLE, MIGRATIONS_TABLE_VERSION_COLUMN};
