//! Error types for command execution.

use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while running an external command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The shell could not be started.
    #[error("failed to start {shell}: {source}")]
    Spawn {
        shell: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O with the running process failed.
    #[error("command i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The command ran but exited unsuccessfully.
    #[error("command failed ({status}){}", format_stderr(.stderr))]
    Failed { status: ExitStatus, stderr: String },

    /// The command did not finish in time and was killed.
    #[error("command timed out after {0:?}")]
    Timeout(Duration),
}

impl CommandError {
    /// Exit code of a failed command, if it exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CommandError::Failed { status, .. } => status.code(),
            _ => None,
        }
    }
}

fn format_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}
