//! SQLite adapter
//!
//! A SQLite database is a file: creating it touches the file, dropping it
//! deletes it. Loading and dumping go through the `sqlite3` client.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::Adapter;
use crate::db::connection::Connection;
use crate::db::executor::ClientCommand;
use crate::db::migrations::{self, MIGRATIONS_TABLE};
use crate::error::{Error, Result};
use crate::utils::shell;

const MEMORY: &str = ":memory:";

pub struct SqliteAdapter<'a> {
    connection: &'a Connection,
    schema: PathBuf,
}

impl<'a> SqliteAdapter<'a> {
    pub fn new(connection: &'a Connection, schema: &Path) -> Self {
        Self {
            connection,
            schema: schema.to_path_buf(),
        }
    }

    /// The database file, unescaped
    fn path(&self) -> Result<PathBuf> {
        self.options()
            .database
            .as_deref()
            .map(PathBuf::from)
            .ok_or_else(|| {
                Error::InvalidUri(format!("{} names no database file", self.connection.uri()))
            })
    }

    fn is_memory(&self) -> bool {
        self.options().database.as_deref() == Some(MEMORY)
    }

    fn escaped_path(&self) -> Result<String> {
        self.database().ok_or_else(|| {
            Error::InvalidUri(format!("{} names no database file", self.connection.uri()))
        })
    }
}

#[async_trait]
impl Adapter for SqliteAdapter<'_> {
    fn connection(&self) -> &Connection {
        self.connection
    }

    fn schema(&self) -> &Path {
        &self.schema
    }

    async fn create(&self) -> Result<()> {
        if self.is_memory() {
            return Ok(());
        }

        let path = self.path()?;
        let permission_denied = |e: std::io::Error| match e.kind() {
            ErrorKind::PermissionDenied => {
                Error::MigrationError(format!("Permission denied: {}", path.display()))
            }
            _ => Error::IoError(e),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(permission_denied)?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(permission_denied)?;

        info!(path = %path.display(), "Created SQLite database");
        Ok(())
    }

    async fn drop(&self) -> Result<()> {
        if self.is_memory() {
            return Ok(());
        }

        let path = self.path()?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!(path = %path.display(), "Dropped SQLite database");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::MigrationError(format!(
                "Cannot find database: {}",
                path.display()
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn load(&self) -> Result<()> {
        if !fs::try_exists(&self.schema).await? {
            return Ok(());
        }

        ClientCommand::new("sqlite3")
            .word(self.escaped_path()?)
            .stdin_from(&self.schema)
            .run()
            .await?;

        info!(schema = %self.schema.display(), "Loaded schema");
        Ok(())
    }

    async fn dump(&self) -> Result<()> {
        let path = self.escaped_path()?;

        ClientCommand::new("sqlite3")
            .word(path.clone())
            .word(".schema")
            .stdout_to(&self.schema)
            .run()
            .await?;

        // Keep only the rows; the table itself is already part of `.schema`.
        let data = ClientCommand::new("sqlite3")
            .word(path)
            .word(shell::escape(&format!(".dump {}", MIGRATIONS_TABLE)))
            .run()
            .await?;

        let inserts: String = data
            .lines()
            .filter(|line| line.starts_with("INSERT"))
            .map(|line| format!("{}\n", line))
            .collect();

        let mut file = OpenOptions::new().append(true).open(&self.schema).await?;
        file.write_all(inserts.as_bytes()).await?;
        file.flush().await?;

        info!(schema = %self.schema.display(), "Dumped schema");
        Ok(())
    }

    /// A database file that does not exist yet has no migrations, so this
    /// answers `None` without opening (and creating) it.
    async fn version(&self) -> Result<Option<String>> {
        if !self.is_memory() && !fs::try_exists(self.path()?).await? {
            return Ok(None);
        }

        match self.connection.handle() {
            Some(handle) => migrations::current_version(handle).await,
            None => Ok(None),
        }
    }
}
