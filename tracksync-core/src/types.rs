//! Domain types for GitHub issues and Pivotal Tracker stories.
//!
//! Field names follow the REST payloads so every type round-trips through
//! serde_json without adapters. Timestamps are `DateTime<Utc>`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::labels::{StockLabel, HAS_PR_LABEL};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// `owner/name` of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse `owner/name`. Both halves must be non-empty.
    pub fn parse(raw: &str) -> Option<Self> {
        let (owner, name) = raw.trim().split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self::new(owner, name))
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// The tracker label joining an issue to its stories: `owner/repo#number`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkLabel(pub String);

impl LinkLabel {
    pub fn for_issue(repo: &RepoRef, number: u64) -> Self {
        Self(format!("{}/{}#{}", repo.owner, repo.name, number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for LinkLabel {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LinkLabel {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Open/closed state of a GitHub issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
}

/// Tracker story type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoryType {
    Feature,
    Bug,
    #[default]
    Chore,
    Release,
}

impl StoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryType::Feature => "feature",
            StoryType::Bug => "bug",
            StoryType::Chore => "chore",
            StoryType::Release => "release",
        }
    }
}

impl fmt::Display for StoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracker story lifecycle state.
///
/// Decoding never fails on an unfamiliar value; it lands in
/// [`StoryState::Unknown`] so the caller decides how fatal that is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum StoryState {
    #[default]
    Unscheduled,
    Unstarted,
    Planned,
    Started,
    Finished,
    Delivered,
    Accepted,
    Rejected,
    Unknown(String),
}

impl StoryState {
    pub fn as_str(&self) -> &str {
        match self {
            StoryState::Unscheduled => "unscheduled",
            StoryState::Unstarted => "unstarted",
            StoryState::Planned => "planned",
            StoryState::Started => "started",
            StoryState::Finished => "finished",
            StoryState::Delivered => "delivered",
            StoryState::Accepted => "accepted",
            StoryState::Rejected => "rejected",
            StoryState::Unknown(raw) => raw,
        }
    }

    /// Started, finished, delivered or rejected: work is underway.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            StoryState::Started | StoryState::Finished | StoryState::Delivered | StoryState::Rejected
        )
    }
}

impl From<String> for StoryState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "unscheduled" => StoryState::Unscheduled,
            "unstarted" => StoryState::Unstarted,
            "planned" => StoryState::Planned,
            "started" => StoryState::Started,
            "finished" => StoryState::Finished,
            "delivered" => StoryState::Delivered,
            "accepted" => StoryState::Accepted,
            "rejected" => StoryState::Rejected,
            _ => StoryState::Unknown(s),
        }
    }
}

impl From<StoryState> for String {
    fn from(state: StoryState) -> Self {
        match state {
            StoryState::Unknown(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for StoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GitHub resources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub html_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    pub owner: User,
    #[serde(default)]
    pub private: bool,
}

impl Repository {
    pub fn repo_ref(&self) -> RepoRef {
        RepoRef::new(self.owner.login.clone(), self.name.clone())
    }
}

/// A repository label. Color is hex without the leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubLabel {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub color: String,
}

/// Present on issues that are pull requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PullRequestLinks {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub state: IssueState,
    #[serde(default)]
    pub labels: Vec<GithubLabel>,
    pub user: User,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<PullRequestLinks>,
    /// Only populated by the search endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
}

impl Issue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.name == name)
    }

    /// Story type implied by the issue's labels: enhancement wins over bug.
    pub fn story_type(&self) -> StoryType {
        if self.has_label(StockLabel::Enhancement.name()) {
            StoryType::Feature
        } else if self.has_label(StockLabel::Bug.name()) {
            StoryType::Bug
        } else {
            StoryType::Chore
        }
    }

    /// Repository parsed from `repository_url` (`…/repos/<owner>/<name>`).
    pub fn repository(&self) -> Option<RepoRef> {
        let url = self.repository_url.as_deref()?;
        let (_, tail) = url.rsplit_once("/repos/")?;
        RepoRef::parse(tail.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    #[serde(default)]
    pub body: String,
    pub user: User,
    #[serde(default)]
    pub html_url: String,
}

// ---------------------------------------------------------------------------
// Tracker resources
// ---------------------------------------------------------------------------

/// Story counts per state, as reported on a tracker label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CountsByStoryState {
    pub unscheduled: u64,
    pub unstarted: u64,
    pub planned: u64,
    pub started: u64,
    pub finished: u64,
    pub delivered: u64,
    pub accepted: u64,
    pub rejected: u64,
}

impl CountsByStoryState {
    pub fn total(&self) -> u64 {
        self.unscheduled
            + self.unstarted
            + self.planned
            + self.started
            + self.finished
            + self.delivered
            + self.accepted
            + self.rejected
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StoryCounts {
    pub number_of_stories_by_state: CountsByStoryState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerLabel {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counts: Option<StoryCounts>,
}

impl TrackerLabel {
    /// Stories carrying this label, across all states. Zero when counts were not requested.
    pub fn story_count(&self) -> u64 {
        self.counts
            .as_ref()
            .map(|c| c.number_of_stories_by_state.total())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: u64,
    #[serde(default)]
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub story_type: StoryType,
    #[serde(rename = "current_state", default)]
    pub state: StoryState,
    #[serde(default)]
    pub labels: Vec<TrackerLabel>,
    #[serde(default)]
    pub accepted_at: Option<DateTime<Utc>>,
}

impl Story {
    pub fn label_named(&self, name: &str) -> Option<&TrackerLabel> {
        self.labels.iter().find(|l| l.name == name)
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.label_named(name).is_some()
    }

    pub fn has_pr(&self) -> bool {
        self.has_label(HAS_PR_LABEL)
    }

    /// Tracker lowercases label names, so the link is matched without case.
    pub fn is_linked_to(&self, link: &LinkLabel) -> bool {
        self.labels
            .iter()
            .any(|l| l.name.eq_ignore_ascii_case(link.as_str()))
    }

    pub fn is_accepted(&self) -> bool {
        self.state == StoryState::Accepted
    }
}

/// Label reference used when creating a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLabel {
    pub name: String,
}

/// Payload for `POST /projects/:id/stories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStory {
    pub name: String,
    pub description: String,
    pub story_type: StoryType,
    #[serde(rename = "current_state")]
    pub state: StoryState,
    pub labels: Vec<NewLabel>,
}

impl NewStory {
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.name == name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_label_format() {
        let repo = RepoRef::new("acme", "widgets");
        assert_eq!(LinkLabel::for_issue(&repo, 42).as_str(), "acme/widgets#42");
    }

    #[test]
    fn repo_ref_parse() {
        assert_eq!(
            RepoRef::parse("acme/widgets"),
            Some(RepoRef::new("acme", "widgets"))
        );
        assert_eq!(RepoRef::parse("acme"), None);
        assert_eq!(RepoRef::parse("/widgets"), None);
        assert_eq!(RepoRef::parse("a/b/c"), None);
    }

    #[test]
    fn story_state_unknown_survives_decode() {
        let state: StoryState = serde_json::from_str("\"icebox\"").expect("decode");
        assert_eq!(state, StoryState::Unknown("icebox".to_string()));
        assert_eq!(serde_json::to_string(&state).expect("encode"), "\"icebox\"");
    }

    #[test]
    fn story_state_known_values() {
        let state: StoryState = serde_json::from_str("\"delivered\"").expect("decode");
        assert_eq!(state, StoryState::Delivered);
        assert!(state.is_in_flight());
        assert!(!StoryState::Planned.is_in_flight());
    }

    #[test]
    fn story_decodes_tracker_payload() {
        let raw = r#"{
            "id": 555,
            "url": "https://www.pivotaltracker.com/story/show/555",
            "name": "Fix the thing",
            "story_type": "bug",
            "current_state": "accepted",
            "accepted_at": "2024-03-01T10:00:00Z",
            "labels": [{"id": 9, "name": "acme/widgets#42"}]
        }"#;
        let story: Story = serde_json::from_str(raw).expect("decode");
        assert_eq!(story.story_type, StoryType::Bug);
        assert!(story.is_accepted());
        assert!(story.has_label("acme/widgets#42"));
        assert!(!story.has_pr());
    }

    #[test]
    fn story_link_ignores_case() {
        let raw = r#"{
            "id": 7,
            "name": "t",
            "story_type": "chore",
            "current_state": "unscheduled",
            "labels": [{"id": 9, "name": "acme/widgets#42"}]
        }"#;
        let story: Story = serde_json::from_str(raw).expect("decode");
        assert!(story.is_linked_to(&LinkLabel::from("Acme/Widgets#42")));
        assert!(!story.is_linked_to(&LinkLabel::from("acme/widgets#4")));
    }

    #[test]
    fn issue_story_type_prefers_enhancement() {
        let raw = r#"{
            "number": 1,
            "title": "t",
            "user": {"id": 1, "login": "octo"},
            "html_url": "https://github.com/acme/widgets/issues/1",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "labels": [{"name": "bug"}, {"name": "enhancement"}]
        }"#;
        let issue: Issue = serde_json::from_str(raw).expect("decode");
        assert_eq!(issue.story_type(), StoryType::Feature);
        assert!(!issue.is_pull_request());
    }

    #[test]
    fn issue_repository_from_search_url() {
        let raw = r#"{
            "number": 7,
            "title": "t",
            "user": {"id": 1, "login": "octo"},
            "html_url": "https://github.com/acme/widgets/issues/7",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "repository_url": "https://api.github.com/repos/acme/widgets",
            "pull_request": {"url": "https://api.github.com/repos/acme/widgets/pulls/7"}
        }"#;
        let issue: Issue = serde_json::from_str(raw).expect("decode");
        assert_eq!(issue.repository(), Some(RepoRef::new("acme", "widgets")));
        assert!(issue.is_pull_request());
    }

    #[test]
    fn label_counts_total() {
        let label = TrackerLabel {
            id: 1,
            name: "x".to_string(),
            counts: Some(StoryCounts {
                number_of_stories_by_state: CountsByStoryState {
                    accepted: 2,
                    started: 1,
                    ..Default::default()
                },
            }),
        };
        assert_eq!(label.story_count(), 3);
    }
}
