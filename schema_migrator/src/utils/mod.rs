//! Utilities for the migrator
//!
//! Shell escaping, identifier quoting and logging setup.

pub mod logging;
pub mod naming;
pub mod shell;

pub use naming::format_sql_identifier;
pub use shell::escape;
