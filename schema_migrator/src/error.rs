//! Error types for the migrator

use thiserror::Error;

/// Result type for migrator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the migrator
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Raised by adapters: unsupported verbs, failed native clients,
    /// missing databases. Never retried.
    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Invalid connection URI: {0}")]
    InvalidUri(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl Error {
    /// The message carried by a `MigrationError`, if this is one
    pub fn migration_message(&self) -> Option<&str> {
        match self {
            Error::MigrationError(message) => Some(message),
            _ => None,
        }
    }
}

/// Convert TOML deserialization errors to migrator errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}

/// Convert URI parse errors to migrator errors
impl From<url::ParseError> for Error {
    fn from(error: url::ParseError) -> Self {
        Error::InvalidUri(error.to_string())
    }
}
