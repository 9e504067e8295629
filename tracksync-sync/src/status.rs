//! Read-only report of what a sync would do to each open issue.

use serde::Serialize;

use tracksync_core::types::{Issue, LinkLabel, StoryType};
use tracksync_core::{GithubApi, StockLabel, TrackerApi};

use crate::error::SyncError;
use crate::labels::LabelChanges;
use crate::syncer::Syncer;

/// One open issue as seen from both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueStatus {
    pub link: String,
    pub title: String,
    pub pull_request: bool,
    /// Linked stories after deduplication.
    pub stories: usize,
    pub all_accepted: bool,
    /// Labels the issue should carry.
    pub labels: Vec<String>,
    /// What a sync would change on the issue.
    pub changes: LabelChanges,
}

impl<G: GithubApi, T: TrackerApi> Syncer<G, T> {
    /// Search queries covering the configured organization or allow-list.
    pub fn status_queries(&self) -> Vec<String> {
        let options = self.options();
        if options.repositories.is_empty() {
            vec![format!("state:open user:{}", options.organization)]
        } else {
            options
                .repositories
                .members()
                .map(|name| format!("state:open repo:{}/{name}", options.organization))
                .collect()
        }
    }

    /// Status of every open issue and pull request found by [`Self::status_queries`].
    pub fn status_report(&self) -> Result<Vec<IssueStatus>, SyncError> {
        let mut report = Vec::new();
        for query in self.status_queries() {
            for issue in self.github().search_issues(&query)? {
                let Some(repo) = issue.repository() else {
                    tracing::warn!("skipping search result without repository: {}", issue.html_url);
                    continue;
                };
                let link = LinkLabel::for_issue(&repo, issue.number);
                let (stories, _) = self.issue_stories(&link)?.dedupe();
                let labels = if stories.is_empty() {
                    pending_labels(&issue)
                } else {
                    stories.issue_labels()?
                };
                report.push(IssueStatus {
                    changes: LabelChanges::between(&issue, &labels),
                    link: link.to_string(),
                    title: issue.title.clone(),
                    pull_request: issue.is_pull_request(),
                    stories: stories.len(),
                    all_accepted: !stories.is_empty() && stories.all_accepted(),
                    labels,
                });
            }
        }
        Ok(report)
    }
}

/// Labels an issue without stories gets once its first chore is created and typed.
fn pending_labels(issue: &Issue) -> Vec<String> {
    let type_label = match issue.story_type() {
        StoryType::Feature => Some(StockLabel::Enhancement),
        StoryType::Bug => Some(StockLabel::Bug),
        StoryType::Chore | StoryType::Release => None,
    };
    type_label
        .into_iter()
        .chain([StockLabel::Unscheduled])
        .map(|l| l.name().to_string())
        .collect()
}
