//! Dispatch loop: records accepted messages and answers them in the background.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use command_runner::{CommandError, CommandRunner, CommandSet, Invocation};
use database::{message, Database, DatabaseError};
use futures::{Stream, StreamExt};
use telegram_client::{TelegramError, Update};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::classify;
use crate::filter;
use crate::sender::ReplySender;

/// Default acknowledgement sent as soon as a message is recorded.
const DEFAULT_ACK_TEXT: &str = "Received... and thinking...";

/// Default reply when a command succeeds without printing anything.
const DEFAULT_EMPTY_REPLY_TEXT: &str = "(no output)";

/// Default number of replies computed at the same time.
const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Default time in-flight replies get to finish on shutdown.
const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Configuration for the message processor.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Text sent right after a message is recorded.
    pub ack_text: String,

    /// Text sent instead of an empty command output.
    /// The stored reply keeps the real (empty) output.
    pub empty_reply_text: String,

    /// Upper bound on background replies running at once. When every slot
    /// is taken the loop waits before accepting the next message.
    pub max_concurrency: usize,

    /// How long shutdown waits for in-flight replies before aborting them.
    pub shutdown_grace: Duration,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            ack_text: DEFAULT_ACK_TEXT.to_string(),
            empty_reply_text: DEFAULT_EMPTY_REPLY_TEXT.to_string(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

/// Errors that can occur during message processing.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The message store rejected a read or write.
    #[error("persistence error: {0}")]
    Persistence(#[from] DatabaseError),

    /// The reply command failed or timed out.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// A message could not be delivered to the chat.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// The update stream reported an error.
    #[error("update stream error: {0}")]
    Stream(#[from] TelegramError),

    /// The update stream ended unexpectedly.
    #[error("update stream ended")]
    StreamEnded,
}

/// Result of handling a single update.
#[derive(Debug)]
pub enum ProcessResult {
    /// Message recorded, acknowledged and handed to a background task.
    Dispatched { chat_id: i64, record_id: i64 },
    /// Message recorded and acknowledged; no commands are configured.
    Acknowledged { chat_id: i64, record_id: i64 },
    /// Update was not addressed to the bot.
    Skipped { reason: String },
    /// Error occurred during processing.
    Error(ProcessorError),
}

/// State shared with background tasks.
struct Shared {
    sender: Arc<dyn ReplySender>,
    db: Database,
    runner: CommandRunner,
    commands: Option<CommandSet>,
    empty_reply_text: String,
}

/// Receives updates, records them and answers them through shell commands.
pub struct MessageProcessor {
    shared: Arc<Shared>,
    bot_identity: String,
    ack_text: String,
    shutdown_grace: Duration,
    permits: Arc<Semaphore>,
    tasks: JoinSet<()>,
}

impl MessageProcessor {
    /// Create a new message processor.
    ///
    /// With `commands = None` the processor only records and acknowledges.
    pub fn new(
        sender: Arc<dyn ReplySender>,
        db: Database,
        runner: CommandRunner,
        commands: Option<CommandSet>,
        bot_identity: impl Into<String>,
        config: ProcessorConfig,
    ) -> Self {
        let shared = Shared {
            sender,
            db,
            runner,
            commands,
            empty_reply_text: config.empty_reply_text,
        };

        Self {
            shared: Arc::new(shared),
            bot_identity: bot_identity.into(),
            ack_text: config.ack_text,
            shutdown_grace: config.shutdown_grace,
            permits: Arc::new(Semaphore::new(config.max_concurrency.max(1))),
            tasks: JoinSet::new(),
        }
    }

    /// Name the bot answers to in group chats.
    pub fn bot_identity(&self) -> &str {
        &self.bot_identity
    }

    /// Number of background replies not yet reaped.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Process a single update and return the result.
    ///
    /// Returns once the message is recorded, acknowledged and its reply
    /// task spawned; the reply itself is computed in the background.
    pub async fn handle_update(&mut self, update: &Update) -> ProcessResult {
        self.reap_finished();

        let incoming = match filter::should_process(update, &self.bot_identity) {
            Ok(incoming) => incoming,
            Err(reason) => {
                debug!("Skipping update {}: {}", update.update_id, reason);
                return ProcessResult::Skipped { reason };
            }
        };

        let chat_id = incoming.chat.id;
        info!(
            chat_id,
            message_id = incoming.message_id,
            "Processing message ({} chars)",
            incoming.body().chars().count()
        );
        debug!("Message {} text: {}", incoming.message_id, incoming.body());

        let record_id = match message::insert_message(self.shared.db.pool(), chat_id, incoming).await
        {
            Ok(id) => id,
            Err(e) => {
                // Without a row there is nothing to attach a reply to.
                error!("Failed to record message from chat {}: {}", chat_id, e);
                return ProcessResult::Error(ProcessorError::Persistence(e));
            }
        };

        if let Err(e) = self.shared.sender.send_reply(chat_id, &self.ack_text).await {
            warn!("Failed to acknowledge message {}: {}", record_id, e);
        }

        let Some(commands) = self.shared.commands.as_ref() else {
            return ProcessResult::Acknowledged { chat_id, record_id };
        };
        let invocation = classify::plan(commands, incoming.body());

        let permit = match Arc::clone(&self.permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                return ProcessResult::Skipped {
                    reason: "worker pool closed".to_string(),
                }
            }
        };

        let shared = Arc::clone(&self.shared);
        self.tasks.spawn(async move {
            let _permit = permit;
            answer(&shared, chat_id, record_id, invocation).await;
        });

        ProcessResult::Dispatched { chat_id, record_id }
    }

    /// Run the processor until the update stream ends.
    pub async fn run<St>(self, updates: St) -> Result<(), ProcessorError>
    where
        St: Stream<Item = Result<Update, TelegramError>>,
    {
        self.run_with_shutdown(updates, std::future::pending()).await
    }

    /// Run the processor with graceful shutdown support.
    ///
    /// This method runs until either:
    /// - The provided shutdown signal completes (returns `Ok`)
    /// - The update stream ends (returns [`ProcessorError::StreamEnded`])
    ///
    /// Either way, in-flight replies are given `shutdown_grace` to finish.
    pub async fn run_with_shutdown<St, S>(
        mut self,
        updates: St,
        shutdown_signal: S,
    ) -> Result<(), ProcessorError>
    where
        St: Stream<Item = Result<Update, TelegramError>>,
        S: Future<Output = ()>,
    {
        info!(
            "Starting message processor as {} (commands: {})",
            self.bot_identity,
            if self.shared.commands.is_some() {
                "enabled"
            } else {
                "acknowledge only"
            }
        );

        tokio::pin!(updates);
        tokio::pin!(shutdown_signal);

        let outcome = loop {
            tokio::select! {
                biased;

                () = &mut shutdown_signal => {
                    info!("Shutdown signal received, stopping message processor");
                    break Ok(());
                }

                next = updates.next() => match next {
                    Some(Ok(update)) => match self.handle_update(&update).await {
                        ProcessResult::Dispatched { chat_id, record_id } => {
                            debug!("Dispatched message {} from chat {}", record_id, chat_id);
                        }
                        ProcessResult::Acknowledged { chat_id, record_id } => {
                            debug!("Acknowledged message {} from chat {}", record_id, chat_id);
                        }
                        ProcessResult::Skipped { reason } => {
                            debug!("Skipped: {}", reason);
                        }
                        ProcessResult::Error(e) => {
                            // Log but continue processing
                            warn!("Error processing update {}: {}", update.update_id, e);
                        }
                    },
                    Some(Err(e)) => {
                        // The stream backs off and retries on its own.
                        error!("Stream error: {}", e);
                    }
                    None => {
                        warn!("Update stream ended");
                        break Err(ProcessorError::StreamEnded);
                    }
                },
            }
        };

        self.drain().await;
        outcome
    }

    /// Run the processor until Ctrl+C is pressed.
    #[cfg(feature = "signal")]
    pub async fn run_until_stopped<St>(self, updates: St) -> Result<(), ProcessorError>
    where
        St: Stream<Item = Result<Update, TelegramError>>,
    {
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };
        self.run_with_shutdown(updates, shutdown).await
    }

    /// Wait for in-flight replies, aborting whatever is left after the
    /// shutdown grace period.
    pub async fn drain(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        info!("Waiting for {} in-flight replies", self.tasks.len());

        let tasks = &mut self.tasks;
        let finished = tokio::time::timeout(self.shutdown_grace, async {
            while let Some(result) = tasks.join_next().await {
                log_join(result);
            }
        })
        .await;

        if finished.is_err() {
            warn!(
                "Aborting {} replies still running after {:?}",
                self.tasks.len(),
                self.shutdown_grace
            );
            self.tasks.abort_all();
            while self.tasks.join_next().await.is_some() {}
        }
    }

    fn reap_finished(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            log_join(result);
        }
    }
}

/// Compute, deliver and store the reply for one recorded message.
async fn answer(shared: &Shared, chat_id: i64, record_id: i64, invocation: Invocation) {
    let output = match shared.runner.run_invocation(&invocation).await {
        Ok(output) => output,
        Err(e) => {
            // The requester sees the failure; the stored reply stays empty.
            warn!("Command for message {} failed: {}", record_id, e);
            if let Err(send_err) = shared.sender.send_reply(chat_id, &e.to_string()).await {
                error!("Failed to report error to chat {}: {}", chat_id, send_err);
            }
            return;
        }
    };

    let text = if output.trim().is_empty() {
        shared.empty_reply_text.as_str()
    } else {
        output.as_str()
    };
    match shared.sender.send_reply(chat_id, text).await {
        Ok(()) => info!("Replied to message {} in chat {}", record_id, chat_id),
        Err(e) => error!("Failed to deliver reply {} to chat {}: {}", record_id, chat_id, e),
    }

    if let Err(e) = message::attach_reply(shared.db.pool(), record_id, &output).await {
        error!("Failed to store reply for message {}: {}", record_id, e);
    }
}

fn log_join(result: Result<(), JoinError>) {
    if let Err(e) = result {
        if e.is_panic() {
            error!("Reply task panicked: {}", e);
        } else {
            debug!("Reply task cancelled: {}", e);
        }
    }
}
