//! JDBC MySQL adapter
//!
//! Creates and drops databases the same way as the MySQL adapter. There is
//! no native client to load or dump with, so those stay unsupported.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{mysql, Adapter};
use crate::db::connection::Connection;
use crate::error::Result;

pub struct JdbcMySqlAdapter<'a> {
    connection: &'a Connection,
    schema: PathBuf,
}

impl<'a> JdbcMySqlAdapter<'a> {
    pub fn new(connection: &'a Connection, schema: &Path) -> Self {
        Self {
            connection,
            schema: schema.to_path_buf(),
        }
    }
}

#[async_trait]
impl Adapter for JdbcMySqlAdapter<'_> {
    fn connection(&self) -> &Connection {
        self.connection
    }

    fn schema(&self) -> &Path {
        &self.schema
    }

    async fn create(&self) -> Result<()> {
        mysql::create_database(self).await
    }

    async fn drop(&self) -> Result<()> {
        mysql::drop_database(self).await
    }
}
