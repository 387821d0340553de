//! musicdash - Browse your music listens with cover art

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cache;
mod cli;
mod config;
mod gallery;
mod graph;
mod utils;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "musicdash=debug,reqwest=debug"
    } else {
        "musicdash=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command.unwrap_or(Commands::Gallery { refreshes: 1 }) {
        Commands::Gallery { refreshes } => {
            cli::commands::gallery(&cli.global, refreshes).await?;
        }
        Commands::Profile => {
            cli::commands::profile(&cli.global).await?;
        }
        Commands::Song { id } => {
            cli::commands::song(&cli.global, &id).await?;
        }
        Commands::ClearCache => {
            cli::commands::clear_cache(&cli.global).await?;
        }
        Commands::Config { action } => {
            cli::commands::config(&cli.global, action)?;
        }
        Commands::Completion { shell } => {
            cli::commands::completion(shell);
        }
    }

    Ok(())
}
