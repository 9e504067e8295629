//! `tracksync status`: what a sync would change, without changing it.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use tracksync_core::GcConfig;
use tracksync_sync::{IssueStatus, Syncer};

use super::{github_client, sync_options, tracker_client, ConnectionArgs};

/// Arguments for `tracksync status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.connection.settings(GcConfig::default())?;
        let syncer = Syncer::new(
            github_client(&settings),
            tracker_client(&settings),
            sync_options(&settings),
        )?;
        let issues = syncer
            .status_report()
            .with_context(|| format!("status failed for '{}'", settings.organization))?;

        let report = StatusReport::new(&settings.organization, issues);
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        print_table(report);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    summary: StatusSummary,
    issues: Vec<IssueStatus>,
}

#[derive(Debug, Serialize)]
struct StatusSummary {
    organization: String,
    issues: usize,
    untracked: usize,
    out_of_sync: usize,
    ready_to_close: usize,
}

impl StatusReport {
    fn new(organization: &str, issues: Vec<IssueStatus>) -> Self {
        let summary = StatusSummary {
            organization: organization.to_string(),
            issues: issues.len(),
            untracked: issues.iter().filter(|i| i.stories == 0).count(),
            out_of_sync: issues.iter().filter(|i| !i.changes.is_empty()).count(),
            ready_to_close: issues.iter().filter(|i| i.all_accepted).count(),
        };
        Self { summary, issues }
    }
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "")]
    indicator: String,
    #[tabled(rename = "issue")]
    link: String,
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "stories")]
    stories: usize,
    #[tabled(rename = "labels")]
    labels: String,
    #[tabled(rename = "pending")]
    pending: String,
}

fn print_table(report: StatusReport) {
    let summary = &report.summary;
    println!(
        "tracksync v{} | {} | {} open issues | {} untracked | {} out of sync | {} ready to close",
        env!("CARGO_PKG_VERSION"),
        summary.organization,
        summary.issues,
        summary.untracked,
        summary.out_of_sync,
        summary.ready_to_close,
    );

    if report.issues.is_empty() {
        println!("No open issues.");
        return;
    }

    let needs_sync = summary.untracked + summary.out_of_sync + summary.ready_to_close > 0;
    let rows: Vec<StatusTableRow> = report
        .issues
        .into_iter()
        .map(|issue| StatusTableRow {
            indicator: indicator(&issue),
            title: shorten(&issue.title, 48),
            stories: issue.stories,
            labels: issue.labels.join(", "),
            pending: pending(&issue),
            link: issue.link,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if needs_sync {
        println!("Run 'tracksync sync' to apply pending changes.");
    }
}

fn indicator(issue: &IssueStatus) -> String {
    if issue.all_accepted {
        "■".blue().bold().to_string()
    } else if issue.stories == 0 {
        "■".bright_black().bold().to_string()
    } else if issue.changes.is_empty() {
        "■".green().bold().to_string()
    } else {
        "■".yellow().bold().to_string()
    }
}

fn pending(issue: &IssueStatus) -> String {
    let mut parts: Vec<String> = Vec::new();
    if issue.stories == 0 {
        parts.push("create story".to_string());
    }
    parts.extend(issue.changes.add.iter().map(|l| format!("+{l}")));
    parts.extend(issue.changes.remove.iter().map(|l| format!("-{l}")));
    if issue.all_accepted {
        parts.push("close".to_string());
    }
    parts.join(" ")
}

fn shorten(title: &str, max: usize) -> String {
    if title.chars().count() <= max {
        return title.to_string();
    }
    let mut short: String = title.chars().take(max.saturating_sub(1)).collect();
    short.push('…');
    short
}
