//! `tracksync init [--force]`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use tracksync_core::config;

/// Write a commented config skeleton.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let path = config::init(self.force).context("failed to write config")?;
        println!("{} Wrote config skeleton", "✓".green().bold());
        println!("  Saved to: {}", path.display());
        println!("  Fill in the tokens, then run `tracksync sync --dry-run`.");
        Ok(())
    }
}
