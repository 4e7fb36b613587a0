//! SQLite console

use super::Console;
use crate::db::connection::ConnectionUri;
use crate::utils::shell;

/// Builds `sqlite3 <path>`
pub struct Sqlite<'a> {
    uri: &'a ConnectionUri,
}

impl<'a> Sqlite<'a> {
    pub fn new(uri: &'a ConnectionUri) -> Self {
        Self { uri }
    }
}

impl Console for Sqlite<'_> {
    fn connection_string(&self) -> String {
        format!("sqlite3 {}", shell::escape(&self.uri.file_path()))
    }
}
