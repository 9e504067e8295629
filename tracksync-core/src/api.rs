//! Collaborator traits for the two REST APIs.
//!
//! The reconciliation engine only talks to these traits. `tracksync-client`
//! implements them over HTTP; tests implement them in memory. Every listing
//! method returns all pages.

use crate::error::ApiError;
use crate::types::{
    GithubLabel, Issue, IssueComment, IssueState, NewStory, RepoRef, Repository, Story,
    StoryType, TrackerLabel, User,
};

/// GitHub operations used by the synchronizer.
pub trait GithubApi {
    /// The authenticated user (`GET /user`).
    fn current_user(&self) -> Result<User, ApiError>;

    /// Public repositories of an organization.
    fn org_repositories(&self, org: &str) -> Result<Vec<Repository>, ApiError>;

    /// Public repositories of a user.
    fn user_repositories(&self, user: &str) -> Result<Vec<Repository>, ApiError>;

    /// Open issues (pull requests included) of a repository.
    fn open_issues(&self, repo: &RepoRef) -> Result<Vec<Issue>, ApiError>;

    /// Issues matching a search query such as `state:open user:acme`.
    fn search_issues(&self, query: &str) -> Result<Vec<Issue>, ApiError>;

    fn labels(&self, repo: &RepoRef) -> Result<Vec<GithubLabel>, ApiError>;

    /// Create a label; an empty color lets GitHub pick one.
    fn create_label(&self, repo: &RepoRef, name: &str, color: &str)
        -> Result<GithubLabel, ApiError>;

    fn update_label_color(
        &self,
        repo: &RepoRef,
        name: &str,
        color: &str,
    ) -> Result<GithubLabel, ApiError>;

    /// Comments on an issue, oldest first.
    fn comments(&self, repo: &RepoRef, number: u64) -> Result<Vec<IssueComment>, ApiError>;

    fn create_comment(
        &self,
        repo: &RepoRef,
        number: u64,
        body: &str,
    ) -> Result<IssueComment, ApiError>;

    fn edit_comment(
        &self,
        repo: &RepoRef,
        comment_id: u64,
        body: &str,
    ) -> Result<IssueComment, ApiError>;

    fn add_issue_labels(&self, repo: &RepoRef, number: u64, labels: &[String])
        -> Result<(), ApiError>;

    fn remove_issue_label(&self, repo: &RepoRef, number: u64, label: &str)
        -> Result<(), ApiError>;

    fn set_issue_state(&self, repo: &RepoRef, number: u64, state: IssueState)
        -> Result<(), ApiError>;

    /// `X-RateLimit-Remaining` of the most recent response, when known.
    fn rate_limit_remaining(&self) -> Option<u32> {
        None
    }
}

/// Pivotal Tracker operations used by the synchronizer, scoped to one project.
pub trait TrackerApi {
    fn stories(&self, query: &StoriesQuery) -> Result<Vec<Story>, ApiError>;

    fn create_story(&self, story: &NewStory) -> Result<Story, ApiError>;

    fn delete_story(&self, story_id: u64) -> Result<(), ApiError>;

    fn set_story_type(&self, story_id: u64, story_type: StoryType) -> Result<Story, ApiError>;

    fn set_story_name(&self, story_id: u64, name: &str) -> Result<Story, ApiError>;

    /// Move a story back to the icebox.
    fn unschedule_story(&self, story_id: u64) -> Result<Story, ApiError>;

    fn add_story_label(&self, story_id: u64, name: &str) -> Result<TrackerLabel, ApiError>;

    fn remove_story_label(&self, story_id: u64, label_id: u64) -> Result<(), ApiError>;

    /// Every project label, with story counts.
    fn labels(&self) -> Result<Vec<TrackerLabel>, ApiError>;

    fn delete_label(&self, label_id: u64) -> Result<(), ApiError>;
}

/// Filter for `GET /projects/:id/stories`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoriesQuery {
    pub label: Option<String>,
}

impl StoriesQuery {
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }

    /// Query parameters, excluding the pagination offset.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        self.label
            .iter()
            .map(|label| ("with_label", label.clone()))
            .collect()
    }
}
