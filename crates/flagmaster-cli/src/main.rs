//! flagmaster CLI: the terminal flag quiz.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use flagmaster_core::GameMode;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "flagmaster", version, about = "Flag quiz game for the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game
    Play {
        /// Start straight away in this mode (normal or blitz)
        #[arg(long)]
        mode: Option<GameMode>,

        /// Path to a .toml country dataset (default: built-in)
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seed for a reproducible question order
        #[arg(long)]
        seed: Option<u64>,

        /// Never call a fun-fact provider
        #[arg(long)]
        offline: bool,
    },

    /// Validate a country dataset
    Validate {
        /// Path to a .toml country dataset (default: built-in)
        #[arg(long)]
        dataset: Option<PathBuf>,
    },

    /// List the countries in a dataset
    Countries {
        /// Only show this difficulty tier
        #[arg(long)]
        tier: Option<u8>,

        /// Path to a .toml country dataset (default: built-in)
        #[arg(long)]
        dataset: Option<PathBuf>,
    },

    /// Create a starter config and an editable copy of the dataset
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            mode,
            dataset,
            config,
            seed,
            offline,
        } => commands::play::execute(mode, dataset, config, seed, offline).await,
        Commands::Validate { dataset } => commands::validate::execute(dataset),
        Commands::Countries { tier, dataset } => commands::countries::execute(tier, dataset),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
