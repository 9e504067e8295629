//! `tracksync gc-labels`: Tracker label cleanup without a sync.

use anyhow::{Context, Result};
use clap::Args;

use tracksync_client::TrackerClient;
use tracksync_core::GcConfig;
use tracksync_sync::{collect_garbage, GcMode};

use super::sync::print_gc;
use super::ConnectionArgs;

/// Arguments for `tracksync gc-labels`.
#[derive(Args, Debug)]
pub struct GcLabelsArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Delete unused labels instead of only listing them.
    #[arg(long)]
    pub delete: bool,
}

impl GcLabelsArgs {
    pub fn run(self) -> Result<()> {
        let merged = self.connection.merged(GcConfig {
            enabled: true,
            delete: self.delete,
        })?;
        let (token, project_id) = merged.tracker_credentials()?;
        let tracker = TrackerClient::new(token, project_id);

        let mode = if merged.gc.delete {
            GcMode::Delete
        } else {
            GcMode::DryRun
        };
        let report = collect_garbage(&tracker, mode)
            .with_context(|| format!("failed to list labels of tracker project {project_id}"))?;
        print_gc(&report, mode, "");
        Ok(())
    }
}
