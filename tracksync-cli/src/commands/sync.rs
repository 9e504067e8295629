//! `tracksync sync`: reconcile issues and stories.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use tracksync_core::{GcConfig, GithubApi, Settings, TrackerApi};
use tracksync_sync::{collect_garbage, DryRunGithub, DryRunTracker, GcMode, GcReport, SyncSummary, Syncer};

use super::{github_client, sync_options, tracker_client, ConnectionArgs};

/// Arguments for `tracksync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Afterwards, look for Tracker labels without stories.
    #[arg(long)]
    pub gc_labels: bool,

    /// Delete the labels found by `--gc-labels`.
    #[arg(long)]
    pub gc_delete: bool,

    /// Log every write instead of performing it.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.connection.settings(GcConfig {
            enabled: self.gc_labels || self.gc_delete,
            delete: self.gc_delete,
        })?;
        let github = github_client(&settings);
        let tracker = tracker_client(&settings);

        if self.dry_run {
            run(
                DryRunGithub::new(github),
                DryRunTracker::new(tracker),
                &settings,
                "[dry-run] ",
            )
        } else {
            run(github, tracker, &settings, "")
        }
    }
}

fn run<G: GithubApi, T: TrackerApi>(
    github: G,
    tracker: T,
    settings: &Settings,
    prefix: &str,
) -> Result<()> {
    let mut syncer = Syncer::new(github, tracker, sync_options(settings))?;
    let summary = match syncer.sync_issues_and_stories() {
        Ok(summary) => summary,
        Err(e) => {
            let remaining = syncer.github().rate_limit_remaining();
            tracing::error!("{}", outcome_line("failed to sync", remaining));
            return Err(e).with_context(|| format!("sync failed for '{}'", settings.organization));
        }
    };
    print_summary(&summary, prefix);

    if settings.gc.enabled {
        let mode = if settings.gc.delete {
            GcMode::Delete
        } else {
            GcMode::DryRun
        };
        let report =
            collect_garbage(syncer.tracker(), mode).context("tracker label cleanup failed")?;
        print_gc(&report, mode, prefix);
    }

    let remaining = syncer.github().rate_limit_remaining();
    tracing::info!("{}", outcome_line("synced", remaining));
    Ok(())
}

/// `outcome`, followed by the GitHub requests left when the API reported them.
fn outcome_line(outcome: &str, remaining: Option<u32>) -> String {
    match remaining {
        Some(remaining) => format!("{outcome}; remaining requests: {remaining}"),
        None => outcome.to_string(),
    }
}

fn print_summary(summary: &SyncSummary, prefix: &str) {
    println!(
        "{prefix}{} {} issue(s) across {} repositories",
        "✓".green().bold(),
        summary.issues,
        summary.repositories
    );
    if summary.skipped_repositories > 0 {
        println!(
            "  {} {} repositories skipped (label setup failed)",
            "!".yellow().bold(),
            summary.skipped_repositories
        );
    }
    let lines = [
        ("stories created", summary.stories_created),
        ("duplicates removed", summary.duplicates_removed),
        ("comments created", summary.comments_created),
        ("comments updated", summary.comments_edited),
        ("issues relabeled", summary.labels_changed),
        ("issues closed", summary.issues_closed),
    ];
    for (what, count) in lines.into_iter().filter(|(_, n)| *n > 0) {
        println!("  {count:>4}  {what}");
    }
}

pub(crate) fn print_gc(report: &GcReport, mode: GcMode, prefix: &str) {
    if report.candidates.is_empty() {
        println!("{prefix}{} no unused tracker labels", "✓".green().bold());
        return;
    }
    match mode {
        GcMode::DryRun => {
            println!(
                "{prefix}{} unused tracker label(s) left in place:",
                report.candidates.len()
            );
            for name in &report.candidates {
                println!("  ~  {name}");
            }
        }
        GcMode::Delete => {
            println!("{prefix}{} tracker label(s) deleted", report.deleted.len());
            for name in &report.deleted {
                println!("  {}  {name}", "✗".red());
            }
            for name in &report.failed {
                println!("  {}  {name} (delete failed)", "!".yellow().bold());
            }
        }
    }
}
