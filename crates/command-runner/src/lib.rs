//! Shell command execution for recbot.
//!
//! - [`CommandRunner`] runs a command line through a shell and captures stdout
//! - [`CommandSet`] holds the two configured pipelines and renders them into
//!   [`Invocation`]s
//!
//! # Example
//!
//! ```no_run
//! use command_runner::{CommandRunner, CommandSet};
//!
//! # async fn example() -> Result<(), command_runner::CommandError> {
//! let runner = CommandRunner::default();
//! let commands = CommandSet::new("curl -s {url} | strip-tags | llm -s 'Summarize'", "llm");
//!
//! let invocation = commands.ask("What is a monad?");
//! let answer = runner.run_invocation(&invocation).await?;
//! println!("{}", answer);
//! # Ok(())
//! # }
//! ```

mod error;
mod runner;
mod template;

pub use error::CommandError;
pub use runner::{CommandRunner, DEFAULT_SHELL, DEFAULT_TIMEOUT};
pub use template::{shell_quote, CommandSet, Invocation, URL_PLACEHOLDER};
