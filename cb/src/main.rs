//! ChamaBot - webhook backend for a community savings group
//!
//! CLI entry point for the webhook server, the reminder sweep and admin
//! provisioning.

use std::fs;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use eyre::{Context, Result};
use tracing::info;

use chamabot::assistant::AssistantDelegate;
use chamabot::cli::{AdminCommand, Cli, Command};
use chamabot::config::Config;
use chamabot::domain::current_period;
use chamabot::llm::OpenAiClient;
use chamabot::outbound::TwilioMessenger;
use chamabot::reminder::ReminderJob;
use chamabot::router::IntentRouter;
use chamabot::server::{AppState, build_router};

use ledgerstore::{LedgerStore, SqliteLedger};

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

fn open_ledger(config: &Config) -> Result<SqliteLedger> {
    if let Some(parent) = config.storage.db_path.parent() {
        fs::create_dir_all(parent).context("Failed to create ledger directory")?;
    }
    SqliteLedger::open(&config.storage.db_path).context("Failed to open ledger database")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    match cli.command {
        Some(Command::Serve { port }) => cmd_serve(&config, port).await,
        Some(Command::Remind) => cmd_remind(&config).await,
        Some(Command::Admin {
            command: AdminCommand::Add { phone },
        }) => cmd_admin_add(&config, &phone).await,
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

/// Run the webhook server
async fn cmd_serve(config: &Config, port_override: Option<u16>) -> Result<()> {
    // Fail fast on missing credentials before binding anything
    config.validate()?;

    let ledger: Arc<dyn LedgerStore> = Arc::new(open_ledger(config)?);

    let llm = Arc::new(OpenAiClient::from_config(&config.llm).context("Failed to create LLM client")?);
    info!("LLM client initialized (model: {})", config.llm.model);

    let messenger =
        Arc::new(TwilioMessenger::from_config(&config.messaging).context("Failed to create messenger")?);

    let assistant = AssistantDelegate::new(
        ledger.clone(),
        llm,
        config.contributions.currency.clone(),
        config.llm.max_tokens,
    );

    let router = IntentRouter::new(
        ledger.clone(),
        assistant,
        config.contributions.clone(),
        config.routing.precedence,
    );

    let reminders = ReminderJob::new(ledger, messenger, config.contributions.clone());

    let app = build_router(AppState {
        router: Arc::new(router),
        reminders: Arc::new(reminders),
    });

    let port = port_override.unwrap_or(config.server.port);
    let addr = format!("{}:{}", config.server.host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind {addr}"))?;

    info!("ChamaBot listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("ChamaBot shut down");
    Ok(())
}

async fn shutdown_signal() {
    // Shutdown on Ctrl+C; in-flight requests finish first
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}

/// Run one reminder sweep for the current period
async fn cmd_remind(config: &Config) -> Result<()> {
    let ledger: Arc<dyn LedgerStore> = Arc::new(open_ledger(config)?);
    let messenger =
        Arc::new(TwilioMessenger::from_config(&config.messaging).context("Failed to create messenger")?);

    let job = ReminderJob::new(ledger, messenger, config.contributions.clone());

    let period = current_period();
    println!("Sending reminders for {period}...");

    let stats = job.run(&period).await?;

    println!("Members checked: {}", stats.members);
    println!("Reminders sent:  {}", stats.reminded);
    if stats.send_failures > 0 {
        println!("Send failures:   {}", stats.send_failures);
    }

    Ok(())
}

/// Flag a phone number as an admin
async fn cmd_admin_add(config: &Config, phone: &str) -> Result<()> {
    let ledger = open_ledger(config)?;
    ledger.insert_admin(phone).await?;
    println!("{phone} is now an admin");
    Ok(())
}
