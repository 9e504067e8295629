//! tracksync: keep Pivotal Tracker stories in step with GitHub issues.
//!
//! # Usage
//!
//! ```text
//! tracksync init [--force]
//! tracksync sync [--organization <org>] [--project-id <id>] [--repository <name>]...
//!                [--label NAME:COLOR]... [--gc-labels [--gc-delete]] [--dry-run]
//! tracksync status [--json]
//! tracksync gc-labels [--delete]
//! ```
//!
//! Tokens and IDs come from flags, then environment variables, then
//! `~/.tracksync/config.yaml`.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{gc_labels::GcLabelsArgs, init::InitArgs, status::StatusArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "tracksync",
    version,
    about = "Synchronize GitHub issues with Pivotal Tracker stories",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a config skeleton to ~/.tracksync/config.yaml.
    Init(InitArgs),

    /// Reconcile every open issue with its Tracker stories.
    Sync(SyncArgs),

    /// Show open issues, their stories and pending label changes.
    Status(StatusArgs),

    /// Find (and optionally delete) Tracker labels no story uses.
    GcLabels(GcLabelsArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::GcLabels(args) => args.run(),
    }
}

/// Logs go to stderr so `status --json` stays machine readable. `log`
/// records from the library crates are captured too.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
