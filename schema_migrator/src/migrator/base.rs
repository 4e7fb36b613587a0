//! Fallback adapter for dialects without a dedicated implementation

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::Adapter;
use crate::db::connection::Connection;

/// Supports only `version`; every other verb fails as unsupported
pub struct BaseAdapter<'a> {
    connection: &'a Connection,
    schema: PathBuf,
}

impl<'a> BaseAdapter<'a> {
    pub fn new(connection: &'a Connection, schema: &Path) -> Self {
        Self {
            connection,
            schema: schema.to_path_buf(),
        }
    }
}

#[async_trait]
impl Adapter for BaseAdapter<'_> {
    fn connection(&self) -> &Connection {
        self.connection
    }

    fn schema(&self) -> &Path {
        &self.schema
    }
}
