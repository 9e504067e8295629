//! Read-only wrappers for previewing a run.
//!
//! Reads go to the wrapped client; writes are logged with a `[dry-run]`
//! prefix and answered with values synthesized from the request.

use tracksync_core::types::{
    GithubLabel, Issue, IssueComment, IssueState, NewStory, RepoRef, Repository, Story,
    StoryType, TrackerLabel, User,
};
use tracksync_core::{ApiError, GithubApi, StoriesQuery, TrackerApi};

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

pub struct DryRunGithub<G> {
    inner: G,
}

impl<G: GithubApi> DryRunGithub<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }

    fn comment(&self, id: u64, body: &str) -> IssueComment {
        IssueComment {
            id,
            body: body.to_string(),
            user: User {
                id: 0,
                login: "dry-run".to_string(),
                html_url: String::new(),
            },
            html_url: String::new(),
        }
    }
}

impl<G: GithubApi> GithubApi for DryRunGithub<G> {
    fn current_user(&self) -> Result<User, ApiError> {
        self.inner.current_user()
    }

    fn org_repositories(&self, org: &str) -> Result<Vec<Repository>, ApiError> {
        self.inner.org_repositories(org)
    }

    fn user_repositories(&self, user: &str) -> Result<Vec<Repository>, ApiError> {
        self.inner.user_repositories(user)
    }

    fn open_issues(&self, repo: &RepoRef) -> Result<Vec<Issue>, ApiError> {
        self.inner.open_issues(repo)
    }

    fn search_issues(&self, query: &str) -> Result<Vec<Issue>, ApiError> {
        self.inner.search_issues(query)
    }

    fn labels(&self, repo: &RepoRef) -> Result<Vec<GithubLabel>, ApiError> {
        self.inner.labels(repo)
    }

    fn create_label(&self, repo: &RepoRef, name: &str, color: &str) -> Result<GithubLabel, ApiError> {
        tracing::info!("[dry-run] would create label '{name}' ({color}) in {repo}");
        Ok(GithubLabel {
            id: 0,
            name: name.to_string(),
            color: color.to_string(),
        })
    }

    fn update_label_color(
        &self,
        repo: &RepoRef,
        name: &str,
        color: &str,
    ) -> Result<GithubLabel, ApiError> {
        tracing::info!("[dry-run] would recolor label '{name}' to {color} in {repo}");
        Ok(GithubLabel {
            id: 0,
            name: name.to_string(),
            color: color.to_string(),
        })
    }

    fn comments(&self, repo: &RepoRef, number: u64) -> Result<Vec<IssueComment>, ApiError> {
        self.inner.comments(repo, number)
    }

    fn create_comment(&self, repo: &RepoRef, number: u64, body: &str) -> Result<IssueComment, ApiError> {
        tracing::info!("[dry-run] would comment on {repo}#{number}");
        Ok(self.comment(0, body))
    }

    fn edit_comment(
        &self,
        repo: &RepoRef,
        comment_id: u64,
        body: &str,
    ) -> Result<IssueComment, ApiError> {
        tracing::info!("[dry-run] would edit comment {comment_id} in {repo}");
        Ok(self.comment(comment_id, body))
    }

    fn add_issue_labels(&self, repo: &RepoRef, number: u64, labels: &[String]) -> Result<(), ApiError> {
        tracing::info!("[dry-run] would add labels [{}] to {repo}#{number}", labels.join(", "));
        Ok(())
    }

    fn remove_issue_label(&self, repo: &RepoRef, number: u64, label: &str) -> Result<(), ApiError> {
        tracing::info!("[dry-run] would remove label '{label}' from {repo}#{number}");
        Ok(())
    }

    fn set_issue_state(&self, repo: &RepoRef, number: u64, state: IssueState) -> Result<(), ApiError> {
        tracing::info!("[dry-run] would mark {repo}#{number} {state:?}");
        Ok(())
    }

    fn rate_limit_remaining(&self) -> Option<u32> {
        self.inner.rate_limit_remaining()
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

pub struct DryRunTracker<T> {
    inner: T,
}

impl<T: TrackerApi> DryRunTracker<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    fn placeholder(story_id: u64) -> Story {
        Story {
            id: story_id,
            url: String::new(),
            name: String::new(),
            description: None,
            story_type: StoryType::default(),
            state: Default::default(),
            labels: vec![],
            accepted_at: None,
        }
    }
}

impl<T: TrackerApi> TrackerApi for DryRunTracker<T> {
    fn stories(&self, query: &StoriesQuery) -> Result<Vec<Story>, ApiError> {
        self.inner.stories(query)
    }

    fn create_story(&self, story: &NewStory) -> Result<Story, ApiError> {
        tracing::info!("[dry-run] would create {} '{}'", story.story_type, story.name);
        Ok(Story {
            id: 0,
            url: String::new(),
            name: story.name.clone(),
            description: Some(story.description.clone()),
            story_type: story.story_type,
            state: story.state.clone(),
            labels: story
                .labels
                .iter()
                .map(|l| TrackerLabel {
                    id: 0,
                    name: l.name.clone(),
                    counts: None,
                })
                .collect(),
            accepted_at: None,
        })
    }

    fn delete_story(&self, story_id: u64) -> Result<(), ApiError> {
        tracing::info!("[dry-run] would delete story #{story_id}");
        Ok(())
    }

    fn set_story_type(&self, story_id: u64, story_type: StoryType) -> Result<Story, ApiError> {
        tracing::info!("[dry-run] would set story #{story_id} type to {story_type}");
        Ok(Self::placeholder(story_id))
    }

    fn set_story_name(&self, story_id: u64, name: &str) -> Result<Story, ApiError> {
        tracing::info!("[dry-run] would rename story #{story_id} to '{name}'");
        Ok(Self::placeholder(story_id))
    }

    fn unschedule_story(&self, story_id: u64) -> Result<Story, ApiError> {
        tracing::info!("[dry-run] would move story #{story_id} to the icebox");
        Ok(Self::placeholder(story_id))
    }

    fn add_story_label(&self, story_id: u64, name: &str) -> Result<TrackerLabel, ApiError> {
        tracing::info!("[dry-run] would label story #{story_id} '{name}'");
        Ok(TrackerLabel {
            id: 0,
            name: name.to_string(),
            counts: None,
        })
    }

    fn remove_story_label(&self, story_id: u64, label_id: u64) -> Result<(), ApiError> {
        tracing::info!("[dry-run] would remove label {label_id} from story #{story_id}");
        Ok(())
    }

    fn labels(&self) -> Result<Vec<TrackerLabel>, ApiError> {
        self.inner.labels()
    }

    fn delete_label(&self, label_id: u64) -> Result<(), ApiError> {
        tracing::info!("[dry-run] would delete label {label_id}");
        Ok(())
    }
}
