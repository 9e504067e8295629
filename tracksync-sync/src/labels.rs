//! GitHub label upkeep: stock label bootstrap per repository and
//! per-issue label reconciliation.

use std::collections::BTreeMap;

use serde::Serialize;

use tracksync_core::labels::normalize_color;
use tracksync_core::types::{Issue, RepoRef};
use tracksync_core::{ApiError, GithubApi, StockLabel};

// ---------------------------------------------------------------------------
// Stock label bootstrap
// ---------------------------------------------------------------------------

/// Labels touched while bootstrapping one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub created: Vec<String>,
    pub recolored: Vec<String>,
}

/// Make sure every label in `canonical` (name → color) exists on `repo`.
///
/// Missing labels are created, with no color when the configured one is
/// empty. Existing labels are recolored only when a non-empty configured
/// color differs. Nothing is ever deleted.
pub fn ensure_stock_labels<G: GithubApi + ?Sized>(
    github: &G,
    repo: &RepoRef,
    canonical: &BTreeMap<String, String>,
) -> Result<BootstrapReport, ApiError> {
    let mut missing = canonical.clone();
    let mut report = BootstrapReport::default();

    for existing in github.labels(repo)? {
        let Some(color) = missing.remove(&existing.name) else {
            continue;
        };
        let color = normalize_color(&color);
        if color.is_empty() || color == normalize_color(&existing.color) {
            continue;
        }
        tracing::info!("updating label '{}' in repo {repo}", existing.name);
        github.update_label_color(repo, &existing.name, &color)?;
        report.recolored.push(existing.name);
    }

    for (name, color) in missing {
        let color = normalize_color(&color);
        tracing::info!("creating label '{name}' with color '{color}' in repo {repo}");
        github.create_label(repo, &name, &color)?;
        report.created.push(name);
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// Issue labels
// ---------------------------------------------------------------------------

/// Difference between an issue's labels and the labels its stories imply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelChanges {
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

impl LabelChanges {
    /// Derived labels the issue lacks, and managed stock labels it carries
    /// that are no longer derived. Unmanaged labels are never removed.
    pub fn between(issue: &Issue, derived: &[String]) -> Self {
        let add = derived
            .iter()
            .filter(|label| !issue.has_label(label))
            .cloned()
            .collect();
        let remove = StockLabel::managed()
            .map(|label| label.name())
            .filter(|name| issue.has_label(name) && !derived.iter().any(|d| d == name))
            .map(str::to_string)
            .collect();
        LabelChanges { add, remove }
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }

    /// Remove, then add. A 404 on removal means the label is already gone.
    pub fn apply<G: GithubApi + ?Sized>(
        &self,
        github: &G,
        repo: &RepoRef,
        number: u64,
    ) -> Result<(), ApiError> {
        for label in &self.remove {
            match github.remove_issue_label(repo, number, label) {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {
                    tracing::debug!("label '{label}' already removed from {repo}#{number}");
                }
                Err(e) => return Err(e),
            }
        }
        if !self.add.is_empty() {
            github.add_issue_labels(repo, number, &self.add)?;
        }
        Ok(())
    }
}
