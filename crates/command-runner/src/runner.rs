//! Subprocess execution.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::CommandError;
use crate::template::Invocation;

/// Shell used when none is configured.
pub const DEFAULT_SHELL: &str = "bash";

/// Default limit on how long a command may run (5 minutes).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Bytes of stderr kept for error reports.
const STDERR_TAIL: usize = 512;

/// Runs command lines through `{shell} -c`.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    shell: String,
    timeout: Option<Duration>,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL, Some(DEFAULT_TIMEOUT))
    }
}

impl CommandRunner {
    /// Create a runner. `timeout = None` lets commands run forever.
    pub fn new(shell: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            shell: shell.into(),
            timeout,
        }
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run a rendered invocation.
    pub async fn run_invocation(&self, invocation: &Invocation) -> Result<String, CommandError> {
        self.run(&invocation.command_line, invocation.stdin.as_deref())
            .await
    }

    /// Run `command` and return everything it wrote to stdout.
    ///
    /// The child inherits the environment. When `stdin` is `None` the child
    /// reads from an empty stdin. A non-zero exit is an error and no output
    /// is returned with it; the tail of stderr is attached instead.
    pub async fn run(&self, command: &str, stdin: Option<&[u8]>) -> Result<String, CommandError> {
        debug!("Running via {}: {}", self.shell, command);

        let mut child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CommandError::Spawn {
                shell: self.shell.clone(),
                source,
            })?;

        // Feed stdin concurrently so a child that writes before it finishes
        // reading cannot deadlock against us.
        let writer = match (stdin, child.stdin.take()) {
            (Some(bytes), Some(mut pipe)) => {
                let bytes = bytes.to_vec();
                Some(tokio::spawn(async move {
                    pipe.write_all(&bytes).await?;
                    pipe.shutdown().await
                }))
            }
            _ => None,
        };

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(output) => output?,
                Err(_) => {
                    warn!("Command timed out after {:?}: {}", limit, command);
                    return Err(CommandError::Timeout(limit));
                }
            },
            None => child.wait_with_output().await?,
        };

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                // The child may exit without reading all of its input.
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => return Err(CommandError::Io(e)),
                Err(e) => return Err(CommandError::Io(std::io::Error::other(e))),
            }
        }

        if !output.status.success() {
            let stderr = stderr_tail(&output.stderr);
            warn!("Command exited with {}: {}", output.status, stderr);
            return Err(CommandError::Failed {
                status: output.status,
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.len() <= STDERR_TAIL {
        return text.to_string();
    }
    let mut start = text.len() - STDERR_TAIL;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    format!("...{}", &text[start..])
}
