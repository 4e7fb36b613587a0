//! Native client executor
//!
//! Dialects that need `createdb`, `psql`, `mysqldump` and friends build a
//! shell command line from already-escaped words and run it through `sh -c`.
//! Environment variables are passed to the child directly and never appear
//! on the command line.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::{Error, Result};
use crate::utils::shell;

/// A native database client invocation
#[derive(Debug, Clone)]
pub struct ClientCommand {
    program: String,
    words: Vec<String>,
    redirects: Vec<String>,
    envs: Vec<(String, String)>,
}

impl ClientCommand {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            words: Vec::new(),
            redirects: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// Append a word that is already shell-escaped
    pub fn word(mut self, word: impl Into<String>) -> Self {
        self.words.push(word.into());
        self
    }

    /// Append an optional, already-escaped word; absence appends nothing
    pub fn word_opt(mut self, word: Option<String>) -> Self {
        self.words.extend(word);
        self
    }

    /// Append `flag` immediately followed by an escaped value, e.g. `--user=root`
    pub fn flag_opt(mut self, flag: &str, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.words.push(format!("{}{}", flag, value));
        }
        self
    }

    /// Set an environment variable for the child; absence leaves it unset
    pub fn env_opt(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.envs.push((key.to_string(), value.to_string()));
        }
        self
    }

    pub fn stdin_from(mut self, path: &Path) -> Self {
        self.redirects.push(format!("< {}", shell::escape(&path.to_string_lossy())));
        self
    }

    pub fn stdout_to(mut self, path: &Path) -> Self {
        self.redirects.push(format!("> {}", shell::escape(&path.to_string_lossy())));
        self
    }

    pub fn append_to(mut self, path: &Path) -> Self {
        self.redirects.push(format!(">> {}", shell::escape(&path.to_string_lossy())));
        self
    }

    pub fn envs(&self) -> &[(String, String)] {
        &self.envs
    }

    /// The full shell command line
    pub fn command_line(&self) -> String {
        shell::join(
            std::iter::once(&self.program)
                .chain(self.words.iter())
                .chain(self.redirects.iter()),
        )
    }

    /// Run the command to completion and return its stdout.
    ///
    /// A non-zero exit is a `MigrationError` carrying the client's stderr, or
    /// the exit status when stderr is empty.
    pub async fn run(&self) -> Result<String> {
        // The command line may carry a password, so only the program is logged.
        tracing::debug!(program = %self.program, "Running native client");

        let output = Command::new("sh")
            .arg("-c")
            .arg(self.command_line())
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => format!("{} exited with {}", self.program, output.status),
                stderr => stderr.to_string(),
            };
            return Err(Error::MigrationError(message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
