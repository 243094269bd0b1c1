//! Brokerage CLI - feed price updates and inspect movement windows

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "brokerage")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the data directory
    #[arg(short, long, default_value = "./data")]
    db_path: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit one share price update and route it to its window
    Feed {
        /// Share identifier
        #[arg(short, long)]
        share: String,

        /// ISO currency code
        #[arg(short, long, default_value = "EUR")]
        currency: String,

        /// Whole currency units
        #[arg(short, long)]
        units: i64,

        /// Nano units (1e-9), same sign as units
        #[arg(short, long, default_value_t = 0)]
        nanos: i32,

        /// Actor the update is emitted as
        #[arg(short, long, default_value = "cli")]
        actor: String,

        /// Window length in seconds
        #[arg(long, default_value_t = 60)]
        activity_secs: i64,
    },

    /// List the windows of a share with their statistics
    Windows {
        /// Share identifier
        #[arg(short, long)]
        share: String,
    },

    /// Store information and status
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let result = match cli.command {
        Commands::Feed {
            share,
            currency,
            units,
            nanos,
            actor,
            activity_secs,
        } => commands::feed::execute(
            cli.db_path,
            commands::feed::FeedArgs {
                share,
                currency,
                units,
                nanos,
                actor,
                activity_secs,
            },
        ),
        Commands::Windows { share } => commands::windows::execute(cli.db_path, share),
        Commands::Status => commands::status::execute(cli.db_path),
    };

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}
