//! leetstats CLI
//!
//! Command-line entry point for the daily solved-count snapshot job.
//! Running `leetstats` with no subcommand performs a sync, so a scheduler
//! only needs to invoke the binary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use leetstats_core::{BackendKind, Config, SnapshotMode, SyncOptions};

mod commands;
mod output;

use output::{Output, OutputFormat};

/// Environment variable holding the log filter
const LOG_ENV: &str = "LEETSTATS_LOG";

#[derive(Parser)]
#[command(name = "leetstats")]
#[command(about = "leetstats - Daily solved-problem snapshots for a roster of users")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file (defaults to ~/.config/leetstats/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Snapshot backend (local or gist)
    #[arg(long, global = true)]
    backend: Option<BackendKind>,

    /// What to record (total or today)
    #[arg(long, global = true)]
    mode: Option<SnapshotMode>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every user and record today's snapshot (default)
    Sync {
        /// Replace today's entry even if it was already recorded
        #[arg(long)]
        force: bool,
        /// Fetch and report without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Record under this date instead of today (UTC)
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,
    },
    /// Show what the snapshot store holds
    Status,
    /// Show configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    let mut config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    debug!(
        "Using {} backend, {} mode, roster {:?}",
        config.backend,
        config.mode,
        config.roster_path()
    );

    let command = cli.command.unwrap_or(Commands::Sync {
        force: false,
        dry_run: false,
        date: None,
    });

    match command {
        Commands::Sync {
            force,
            dry_run,
            date,
        } => {
            let options = SyncOptions { force, dry_run };
            commands::sync::sync(&config, options, date, &output).await
        }
        Commands::Status => commands::status::show(&config, &output).await,
        Commands::Config { command } => match command {
            Some(ConfigCommands::Show) | None => {
                commands::config::show(&config, cli.config.as_ref(), &output)
            }
        },
    }
}

/// Log to stderr, filtered by LEETSTATS_LOG (default: warnings only)
fn init_logging() {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
