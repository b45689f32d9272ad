//! Review assistant CLI
//!
//! `collect` builds the corpus CSV; `ask` and `chat` answer questions over it.

mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,review_assistant=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Collect(args) => commands::collect(&config, args).await,
        Command::Ask { question, query } => commands::ask(&config, &question, query).await,
        Command::Chat(query) => commands::chat(&config, query).await,
    }
}
