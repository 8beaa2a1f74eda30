//! autocommit - CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;

use autocommit::config::Config;
use autocommit::run::{run, RunOptions};

/// Draft a commit message for pending changes and apply the commit.
#[derive(Parser, Debug)]
#[command(name = "autocommit")]
#[command(about = "Write AI-drafted commit messages for pending working-tree changes")]
#[command(version)]
struct Cli {
    /// Generate the message but skip confirmation and commit
    #[arg(long)]
    dry_run: bool,

    /// Answer yes/no prompts affirmatively
    #[arg(short = 'y', long)]
    yes: bool,

    /// Disable the version bump even if ENABLE_VERSIONING is set
    #[arg(long)]
    no_versioning: bool,

    /// Enable debug-level diagnostics
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A .env next to the working directory supplies credentials
    dotenvy::dotenv().ok();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config = Config::from_env().context("Environment is not configured")?;

    let options = RunOptions {
        dry_run: cli.dry_run,
        assume_yes: cli.yes,
        no_versioning: cli.no_versioning,
    };

    run(&config, &options).await?;

    Ok(())
}
