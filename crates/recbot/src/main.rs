//! recbot: records Telegram messages and answers them through shell pipelines.
//!
//! Links are summarized by the summary pipeline, everything else is piped to
//! the ask pipeline. Every accepted message and its reply are stored.
//! `recbot tail` follows the stored messages and prints them as JSON lines.
//!
//! Configuration via flags, environment variables or a .env file:
//!   TGBOT_TOKEN            - Bot token (required)
//!   RECBOT_DB_DSN          - Database URL (required)
//!   RECBOT_SUMMARY_COMMAND - Pipeline for links, with a {url} placeholder
//!   RECBOT_ASK_COMMAND     - Pipeline reading the question on stdin
//!   RUST_LOG               - Log filter (overrides --debug)

mod config;
mod tail;

use std::sync::Arc;

use clap::Parser;
use command_runner::CommandRunner;
use database::{message, Database};
use message_listener::MessageProcessor;
use telegram_client::TelegramClient;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Args, Command, Settings, TailSettings};

/// Rows inspected at startup when reporting unanswered messages.
const UNANSWERED_REPORT_LIMIT: i64 = 100;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (searches current dir and parents)
    let _ = dotenvy::dotenv();

    let mut args = Args::parse();
    init_tracing(args.debug);

    if let Some(Command::Tail(tail_args)) = args.command.take() {
        let settings = TailSettings::from_args(args.dsn, tail_args)?;
        return run_tail(settings).await;
    }

    let settings = Settings::from_args(args)?;

    let db = Database::connect_with_pool_size(&settings.dsn, settings.db_pool_size).await?;

    if settings.flush_db {
        db.reset().await?;
        db.close().await;
        println!("Dropped the message table.");
        return Ok(());
    }

    db.ensure_schema().await?;
    report_unanswered(&db).await;

    let client = TelegramClient::connect(settings.bot.clone()).await?;
    let identity = client.me().display_identity();

    let runner = CommandRunner::new(&settings.shell, settings.command_timeout);
    match &settings.commands {
        Some(commands) => info!(
            "Summary pipeline: {} | ask pipeline: {}",
            commands.summary, commands.ask
        ),
        None => info!("Acknowledge-only mode, no pipelines configured"),
    }

    let updates = telegram_client::subscribe(&client);
    let processor = MessageProcessor::new(
        Arc::new(client),
        db.clone(),
        runner,
        settings.commands,
        identity,
        settings.processor,
    );

    info!("recbot is running. Press Ctrl+C to stop.");
    let result = processor.run_until_stopped(updates).await;

    db.close().await;
    info!("Database pool closed");

    result?;
    Ok(())
}

/// Print stored messages until Ctrl+C.
async fn run_tail(settings: TailSettings) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect_with_pool_size(&settings.dsn, 1).await?;
    db.ensure_schema().await?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    let mut out = std::io::stdout();
    let result = tail::run(&settings, db.clone(), &mut out, shutdown).await;

    db.close().await;
    result?;
    Ok(())
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // stderr keeps stdout free for `tail` output.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Warn about messages a previous run accepted but never answered.
async fn report_unanswered(db: &Database) {
    match message::list_unanswered(db.pool(), UNANSWERED_REPORT_LIMIT).await {
        Ok(rows) if rows.is_empty() => {}
        Ok(rows) => warn!(
            "{} earlier messages have no stored reply (oldest id {})",
            rows.len(),
            rows[0].id
        ),
        Err(e) => warn!("Could not check for unanswered messages: {}", e),
    }
}
