use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pagefx_core::PageFxConfig;

mod commands;
mod scenario;
mod simulation;

#[derive(Parser)]
#[command(name = "pagefx")]
#[command(author, version, about = "Replay storefront interaction scenarios")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ~/.config/pagefx/config.toml)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario file and print the resulting page state
    Simulate {
        /// Scenario TOML file
        scenario: PathBuf,
        /// Pace frames on the wall clock instead of running them back to back
        #[arg(long)]
        realtime: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the injected keyframe stylesheet
    Keyframes,
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => PageFxConfig::load_from(path)?,
        None => PageFxConfig::load()?,
    };

    match cli.command {
        Commands::Simulate {
            scenario,
            realtime,
            json,
        } => commands::simulate::run(config, &scenario, realtime, json).await,
        Commands::Keyframes => commands::keyframes::run(&config),
        Commands::Config => commands::config::run(&config),
    }
}
