//! The reconciliation engine.
//!
//! For each selected repository: bootstrap stock labels, then walk every
//! open issue through the same fixed sequence of steps:
//!
//! 1. look up linked stories, delete duplicates (lowest ID wins)
//! 2. create the initial chore when none exist
//! 3. create a `reopened:` chore when the issue moved after final acceptance
//! 4. fix type and name of a lone, untouched story; copy issue labels
//! 5. add or remove `has-pr`
//! 6. create or refresh the status comment
//! 7. reconcile GitHub labels
//! 8. close the issue once everything is accepted
//!
//! A failing issue is recorded and the walk continues. Only an unknown story
//! state stops the run.

use std::collections::BTreeMap;

use serde::Serialize;

use tracksync_core::labels::{canonical_labels, is_managed_label};
use tracksync_core::types::{Issue, IssueState, LinkLabel, RepoRef, Repository, Story, StoryState, StoryType, User};
use tracksync_core::{ApiError, GithubApi, LabelSpec, RepoSet, StoriesQuery, TrackerApi, HAS_PR_LABEL};
use tracksync_renderer::Renderer;

use crate::chore::{new_issue_chore, reopened_issue_chore};
use crate::error::{IssueFailure, SyncError};
use crate::labels::{ensure_stock_labels, LabelChanges};
use crate::story_set::StorySet;

// ---------------------------------------------------------------------------
// Options and summary
// ---------------------------------------------------------------------------

/// What to sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// GitHub organization (or user) owning the repositories.
    pub organization: String,
    /// Repository allow-list; empty syncs every public repository.
    pub repositories: RepoSet,
    /// Labels kept on every repository in addition to the stock ones.
    pub labels: Vec<LabelSpec>,
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub repositories: usize,
    pub skipped_repositories: usize,
    pub issues: usize,
    pub stories_created: usize,
    pub duplicates_removed: usize,
    pub comments_created: usize,
    pub comments_edited: usize,
    pub labels_changed: usize,
    pub issues_closed: usize,
}

// ---------------------------------------------------------------------------
// Syncer
// ---------------------------------------------------------------------------

pub struct Syncer<G, T> {
    github: G,
    tracker: T,
    renderer: Renderer,
    options: SyncOptions,
    canonical_labels: BTreeMap<String, String>,
    cached_user: Option<User>,
}

impl<G: GithubApi, T: TrackerApi> Syncer<G, T> {
    pub fn new(github: G, tracker: T, options: SyncOptions) -> Result<Self, SyncError> {
        let canonical_labels = canonical_labels(&options.labels);
        Ok(Self {
            github,
            tracker,
            renderer: Renderer::new()?,
            options,
            canonical_labels,
            cached_user: None,
        })
    }

    pub fn github(&self) -> &G {
        &self.github
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Sync every selected repository. Per-issue failures are collected and
    /// returned together as [`SyncError::Failures`] once the walk is done.
    pub fn sync_issues_and_stories(&mut self) -> Result<SyncSummary, SyncError> {
        let repositories = self.repositories()?;
        let mut summary = SyncSummary::default();
        let mut failures = Vec::new();

        for repository in &repositories {
            let repo = repository.repo_ref();
            tracing::info!("syncing {repo}");

            if let Err(e) = ensure_stock_labels(&self.github, &repo, &self.canonical_labels) {
                tracing::warn!("failed setting up labels; skipping {repo}: {e}");
                summary.skipped_repositories += 1;
                continue;
            }
            summary.repositories += 1;

            let issues = match self.github.open_issues(&repo) {
                Ok(issues) => issues,
                Err(e) => {
                    tracing::warn!("failed to fetch issues for {repo}: {e}");
                    failures.push(IssueFailure {
                        link: repo.to_string(),
                        error: e.into(),
                    });
                    continue;
                }
            };

            for issue in &issues {
                summary.issues += 1;
                match self.sync_issue(&repo, issue, &mut summary) {
                    Ok(()) => {}
                    Err(e @ SyncError::UnknownStoryState { .. }) => return Err(e),
                    Err(e) => {
                        let link = LinkLabel::for_issue(&repo, issue.number);
                        tracing::warn!("failed to sync {link}: {e}");
                        failures.push(IssueFailure {
                            link: link.to_string(),
                            error: e,
                        });
                    }
                }
            }
        }

        tracing::info!(
            "synced {} issue(s) across {} repositories ({} skipped); {} stories created, {} comments created, {} edited, {} issues closed",
            summary.issues,
            summary.repositories,
            summary.skipped_repositories,
            summary.stories_created,
            summary.comments_created,
            summary.comments_edited,
            summary.issues_closed,
        );

        if failures.is_empty() {
            Ok(summary)
        } else {
            Err(SyncError::Failures(failures))
        }
    }

    /// Public repositories of the organization, falling back to the user of
    /// the same name, narrowed to the allow-list.
    pub fn repositories(&self) -> Result<Vec<Repository>, ApiError> {
        let org = &self.options.organization;
        let mut repositories = match self.github.org_repositories(org) {
            Ok(repos) => repos,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => return Err(e),
        };
        if repositories.is_empty() {
            tracing::debug!("no organization repositories for {org}; trying user repositories");
            repositories = self.github.user_repositories(org)?;
        }
        if !self.options.repositories.is_empty() {
            repositories.retain(|r| self.options.repositories.contains(&r.name));
        }
        Ok(repositories)
    }

    /// Stories carrying `link`, in no particular order.
    pub fn issue_stories(&self, link: &LinkLabel) -> Result<StorySet, ApiError> {
        let stories = self
            .tracker
            .stories(&StoriesQuery::with_label(link.as_str()))?
            .into_iter()
            .filter(|s| s.is_linked_to(link))
            .collect::<Vec<_>>();
        Ok(StorySet::new(stories))
    }

    /// Reconcile one open issue with its stories.
    pub fn sync_issue(
        &mut self,
        repo: &RepoRef,
        issue: &Issue,
        summary: &mut SyncSummary,
    ) -> Result<(), SyncError> {
        let link = LinkLabel::for_issue(repo, issue.number);
        tracing::info!("syncing {link}: {}", issue.title);

        let (mut stories, duplicates) = self.issue_stories(&link)?.dedupe();
        for duplicate in duplicates {
            tracing::info!("removing duplicate story #{}", duplicate.id);
            match self.tracker.delete_story(duplicate.id) {
                Ok(()) => summary.duplicates_removed += 1,
                Err(e) => tracing::warn!("failed to remove duplicate #{}: {e}", duplicate.id),
            }
        }

        if stories.is_empty() {
            let story = self
                .tracker
                .create_story(&new_issue_chore(&self.renderer, issue, &link)?)?;
            tracing::info!("created story for {link} at {}", story.url);
            stories.push(story);
            summary.stories_created += 1;
        } else if stories.all_accepted() && issue.updated_at > stories.last_accepted() {
            let story = self
                .tracker
                .create_story(&reopened_issue_chore(&self.renderer, issue, &link)?)?;
            tracing::info!("created chore for reopening of {link} at {}", story.url);
            stories.push(story);
            summary.stories_created += 1;
        }

        if stories.len() == 1 && (stories.untriaged() || stories.unscheduled()) {
            if let Some(story) = stories.iter_mut().next() {
                self.sync_story_from_issue(story, issue)?;
            }
        }

        self.sync_pr_label(&mut stories, issue)?;
        self.upsert_status_comment(repo, issue, &stories, summary)?;

        let changes = LabelChanges::between(issue, &stories.issue_labels()?);
        if !changes.is_empty() {
            tracing::info!(
                "setting labels on {link}: +[{}] -[{}]",
                changes.add.join(", "),
                changes.remove.join(", ")
            );
            changes.apply(&self.github, repo, issue.number)?;
            summary.labels_changed += 1;
        }

        if stories.all_accepted() {
            tracing::info!("all stories for {link} are accepted; closing");
            let body = self.renderer.closed_comment(stories.as_slice())?;
            self.github.create_comment(repo, issue.number, &body)?;
            self.github
                .set_issue_state(repo, issue.number, IssueState::Closed)?;
            summary.issues_closed += 1;
        }

        Ok(())
    }

    /// Align type, name and labels of the single story with its issue.
    /// Changes are mirrored onto `story` as they are made.
    fn sync_story_from_issue(&self, story: &mut Story, issue: &Issue) -> Result<(), ApiError> {
        let wanted = issue.story_type();

        if story.state == StoryState::Started
            && story.story_type == StoryType::Chore
            && wanted != StoryType::Chore
        {
            tracing::info!("moving story #{} to the icebox", story.id);
            self.tracker.unschedule_story(story.id)?;
            story.state = StoryState::Unscheduled;
        }

        if story.story_type != wanted {
            tracing::info!("updating story #{} type to '{wanted}'", story.id);
            self.tracker.set_story_type(story.id, wanted)?;
            story.story_type = wanted;
        }

        if story.name != issue.title {
            tracing::info!("syncing story #{} name", story.id);
            self.tracker.set_story_name(story.id, &issue.title)?;
            story.name = issue.title.clone();
        }

        for label in &issue.labels {
            if is_managed_label(&label.name) || story.has_label(&label.name) {
                continue;
            }
            tracing::info!("syncing issue label '{}' to story #{}", label.name, story.id);
            match self.tracker.add_story_label(story.id, &label.name) {
                Ok(added) => story.labels.push(added),
                Err(e) => tracing::warn!("failed to add label to story #{}: {e}", story.id),
            }
        }

        Ok(())
    }

    fn sync_pr_label(&self, stories: &mut StorySet, issue: &Issue) -> Result<(), ApiError> {
        if issue.is_pull_request() && !stories.has_pr() {
            for story in stories.iter_mut().filter(|s| !s.has_pr()) {
                tracing::info!("adding {HAS_PR_LABEL} label to #{}", story.id);
                let added = self.tracker.add_story_label(story.id, HAS_PR_LABEL)?;
                story.labels.push(added);
            }
        } else if !issue.is_pull_request() && stories.has_pr() {
            for story in stories.iter_mut() {
                let label_ids: Vec<u64> = story
                    .labels
                    .iter()
                    .filter(|l| l.name == HAS_PR_LABEL)
                    .map(|l| l.id)
                    .collect();
                for label_id in label_ids {
                    tracing::info!("removing {HAS_PR_LABEL} label from #{}", story.id);
                    self.tracker.remove_story_label(story.id, label_id)?;
                }
                story.labels.retain(|l| l.name != HAS_PR_LABEL);
            }
        }
        Ok(())
    }

    fn upsert_status_comment(
        &mut self,
        repo: &RepoRef,
        issue: &Issue,
        stories: &StorySet,
        summary: &mut SyncSummary,
    ) -> Result<(), SyncError> {
        let body = self.renderer.status_comment(stories.as_slice())?;
        let comments = self.github.comments(repo, issue.number)?;
        let me = self.current_user()?.id;

        let existing = comments
            .iter()
            .rev()
            .find(|c| c.user.id == me && self.renderer.is_status_comment(&c.body));
        match existing {
            None => {
                let created = self.github.create_comment(repo, issue.number, &body)?;
                tracing::info!("created comment: {}", created.html_url);
                summary.comments_created += 1;
            }
            Some(existing) if existing.body != body => {
                let edited = self.github.edit_comment(repo, existing.id, &body)?;
                tracing::info!("updated comment: {}", edited.html_url);
                summary.comments_edited += 1;
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// The authenticated GitHub user, fetched once per syncer.
    fn current_user(&mut self) -> Result<&User, ApiError> {
        let user = match self.cached_user.take() {
            Some(user) => user,
            None => self.github.current_user()?,
        };
        Ok(self.cached_user.insert(user))
    }
}
