use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use droidpulse_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "droidpulse")]
#[command(author, version, about = "Draft social posts from new AOSP changes and Android blog entries")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (defaults to ~/.config/droidpulse/config.toml)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, draft and send to Telegram (default)
    Run,
    /// Print the message a run would send, without sending or saving state
    Preview,
    /// Inspect or clear processed item ids
    State {
        #[command(subcommand)]
        action: StateAction,
    },
}

#[derive(Subcommand)]
enum StateAction {
    /// Show how many ids are stored and the most recent ones
    Show,
    /// Delete the state file
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Some(Commands::Run) | None => commands::run::run(&config).await,
        Some(Commands::Preview) => commands::preview::run(&config).await,
        Some(Commands::State { action }) => match action {
            StateAction::Show => commands::state::show(&config),
            StateAction::Reset => commands::state::reset(&config),
        },
    }
}
