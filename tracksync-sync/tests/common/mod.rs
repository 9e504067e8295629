//! In-memory GitHub and Tracker fakes that record every write.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Deref;
use std::rc::Rc;

use chrono::{DateTime, TimeZone, Utc};
use tracksync_core::types::{
    CountsByStoryState, GithubLabel, Issue, IssueComment, IssueState, NewStory, PullRequestLinks,
    RepoRef, Repository, Story, StoryCounts, StoryState, StoryType, TrackerLabel, User,
};
use tracksync_core::{ApiError, GithubApi, Service, StoriesQuery, TrackerApi};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn at(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, 12, 0, 0).unwrap()
}

fn not_found(service: Service, operation: &'static str) -> ApiError {
    ApiError::Status {
        service,
        operation,
        status: 404,
        body: "Not Found".to_string(),
    }
}

fn server_error(service: Service, operation: &'static str) -> ApiError {
    ApiError::Status {
        service,
        operation,
        status: 500,
        body: "boom".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn me() -> User {
    User {
        id: 1,
        login: "tracksync-bot".to_string(),
        html_url: "https://github.com/tracksync-bot".to_string(),
    }
}

pub fn octo() -> User {
    User {
        id: 7,
        login: "octo".to_string(),
        html_url: "https://github.com/octo".to_string(),
    }
}

pub fn repository(owner: &str, name: &str) -> Repository {
    Repository {
        id: 0,
        name: name.to_string(),
        owner: User {
            id: 100,
            login: owner.to_string(),
            html_url: String::new(),
        },
        private: false,
    }
}

pub fn issue(repo: &RepoRef, number: u64, title: &str) -> Issue {
    Issue {
        number,
        title: title.to_string(),
        body: None,
        state: IssueState::Open,
        labels: vec![],
        user: octo(),
        html_url: format!("https://github.com/{repo}/issues/{number}"),
        created_at: at(1, 2),
        updated_at: at(1, 2),
        pull_request: None,
        repository_url: None,
    }
}

pub fn pull_request(repo: &RepoRef, number: u64, title: &str) -> Issue {
    let mut pr = issue(repo, number, title);
    pr.pull_request = Some(PullRequestLinks {
        url: Some(format!("https://api.github.com/repos/{repo}/pulls/{number}")),
        html_url: None,
    });
    pr
}

pub fn with_labels(mut issue: Issue, labels: &[&str]) -> Issue {
    issue.labels = labels
        .iter()
        .map(|name| GithubLabel {
            id: 0,
            name: name.to_string(),
            color: String::new(),
        })
        .collect();
    issue
}

pub fn story(id: u64, link: &str, story_type: StoryType, state: StoryState) -> Story {
    Story {
        id,
        url: format!("https://www.pivotaltracker.com/story/show/{id}"),
        name: String::new(),
        description: None,
        story_type,
        state,
        labels: vec![TrackerLabel {
            id: id * 10,
            name: link.to_string(),
            counts: None,
        }],
        accepted_at: None,
    }
}

pub fn tracker_label(id: u64, name: &str, counts: Option<CountsByStoryState>) -> TrackerLabel {
    TrackerLabel {
        id,
        name: name.to_string(),
        counts: counts.map(|c| StoryCounts {
            number_of_stories_by_state: c,
        }),
    }
}

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct GithubState {
    pub user: RefCell<Option<User>>,
    pub org_repos: RefCell<Vec<Repository>>,
    pub user_repos: RefCell<Vec<Repository>>,
    pub org_not_found: Cell<bool>,
    pub issues: RefCell<BTreeMap<RepoRef, Vec<Issue>>>,
    pub labels: RefCell<BTreeMap<RepoRef, Vec<GithubLabel>>>,
    pub comments: RefCell<BTreeMap<(RepoRef, u64), Vec<IssueComment>>>,
    /// Repository names whose label listing fails.
    pub failing_labels: RefCell<BTreeSet<String>>,
    /// Issue numbers whose comment listing fails.
    pub failing_comments: RefCell<BTreeSet<u64>>,
    /// Issue label removals fail with a server error.
    pub failing_label_removals: Cell<bool>,
    pub user_calls: Cell<usize>,
    pub writes: RefCell<Vec<String>>,
    next_id: Cell<u64>,
}

/// Cheap to clone; clones share state so a test keeps a handle after
/// moving one into the syncer.
#[derive(Clone, Default)]
pub struct FakeGithub(Rc<GithubState>);

impl Deref for FakeGithub {
    type Target = GithubState;

    fn deref(&self) -> &GithubState {
        &self.0
    }
}

impl FakeGithub {
    pub fn new() -> Self {
        let github = Self::default();
        *github.user.borrow_mut() = Some(me());
        github.next_id.set(500);
        github
    }

    pub fn add_repo(&self, repo: &RepoRef) {
        self.org_repos
            .borrow_mut()
            .push(repository(&repo.owner, &repo.name));
        self.issues.borrow_mut().entry(repo.clone()).or_default();
    }

    pub fn add_issue(&self, repo: &RepoRef, issue: Issue) {
        self.issues
            .borrow_mut()
            .entry(repo.clone())
            .or_default()
            .push(issue);
    }

    pub fn add_comment(&self, repo: &RepoRef, number: u64, user: User, body: &str) -> u64 {
        let id = self.next();
        self.comments
            .borrow_mut()
            .entry((repo.clone(), number))
            .or_default()
            .push(IssueComment {
                id,
                body: body.to_string(),
                user,
                html_url: format!("https://github.com/{repo}/issues/{number}#issuecomment-{id}"),
            });
        id
    }

    pub fn issue(&self, repo: &RepoRef, number: u64) -> Issue {
        self.issues.borrow()[repo]
            .iter()
            .find(|i| i.number == number)
            .cloned()
            .expect("issue present")
    }

    pub fn issue_label_names(&self, repo: &RepoRef, number: u64) -> Vec<String> {
        self.issue(repo, number)
            .labels
            .into_iter()
            .map(|l| l.name)
            .collect()
    }

    pub fn comments_on(&self, repo: &RepoRef, number: u64) -> Vec<IssueComment> {
        self.comments
            .borrow()
            .get(&(repo.clone(), number))
            .cloned()
            .unwrap_or_default()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.borrow().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.borrow_mut().clear();
    }

    fn record(&self, write: String) {
        self.writes.borrow_mut().push(write);
    }

    fn next(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn with_issue<R>(&self, repo: &RepoRef, number: u64, f: impl FnOnce(&mut Issue) -> R) -> Option<R> {
        self.issues
            .borrow_mut()
            .get_mut(repo)?
            .iter_mut()
            .find(|i| i.number == number)
            .map(f)
    }
}

impl GithubApi for FakeGithub {
    fn current_user(&self) -> Result<User, ApiError> {
        self.user_calls.set(self.user_calls.get() + 1);
        Ok(self.user.borrow().clone().expect("user configured"))
    }

    fn org_repositories(&self, _org: &str) -> Result<Vec<Repository>, ApiError> {
        if self.org_not_found.get() {
            return Err(not_found(Service::Github, "list organization repositories"));
        }
        Ok(self.org_repos.borrow().clone())
    }

    fn user_repositories(&self, _user: &str) -> Result<Vec<Repository>, ApiError> {
        Ok(self.user_repos.borrow().clone())
    }

    fn open_issues(&self, repo: &RepoRef) -> Result<Vec<Issue>, ApiError> {
        Ok(self
            .issues
            .borrow()
            .get(repo)
            .map(|issues| {
                issues
                    .iter()
                    .filter(|i| i.state == IssueState::Open)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn search_issues(&self, query: &str) -> Result<Vec<Issue>, ApiError> {
        let only_repo = query
            .split_whitespace()
            .find_map(|term| term.strip_prefix("repo:"))
            .and_then(RepoRef::parse);
        let mut found = Vec::new();
        for (repo, issues) in self.issues.borrow().iter() {
            if only_repo.as_ref().is_some_and(|r| r != repo) {
                continue;
            }
            for issue in issues.iter().filter(|i| i.state == IssueState::Open) {
                let mut hit = issue.clone();
                hit.repository_url = Some(format!("https://api.github.com/repos/{repo}"));
                found.push(hit);
            }
        }
        Ok(found)
    }

    fn labels(&self, repo: &RepoRef) -> Result<Vec<GithubLabel>, ApiError> {
        if self.failing_labels.borrow().contains(&repo.name) {
            return Err(server_error(Service::Github, "list labels"));
        }
        Ok(self.labels.borrow().get(repo).cloned().unwrap_or_default())
    }

    fn create_label(&self, repo: &RepoRef, name: &str, color: &str) -> Result<GithubLabel, ApiError> {
        self.record(format!("create_label {repo} {name} {color}"));
        let label = GithubLabel {
            id: self.next(),
            name: name.to_string(),
            color: color.to_string(),
        };
        self.labels
            .borrow_mut()
            .entry(repo.clone())
            .or_default()
            .push(label.clone());
        Ok(label)
    }

    fn update_label_color(&self, repo: &RepoRef, name: &str, color: &str) -> Result<GithubLabel, ApiError> {
        self.record(format!("update_label {repo} {name} {color}"));
        let mut labels = self.labels.borrow_mut();
        let label = labels
            .get_mut(repo)
            .and_then(|ls| ls.iter_mut().find(|l| l.name == name))
            .ok_or_else(|| not_found(Service::Github, "update label"))?;
        label.color = color.to_string();
        Ok(label.clone())
    }

    fn comments(&self, repo: &RepoRef, number: u64) -> Result<Vec<IssueComment>, ApiError> {
        if self.failing_comments.borrow().contains(&number) {
            return Err(server_error(Service::Github, "list comments"));
        }
        Ok(self.comments_on(repo, number))
    }

    fn create_comment(&self, repo: &RepoRef, number: u64, body: &str) -> Result<IssueComment, ApiError> {
        self.record(format!("create_comment {repo}#{number}"));
        let user = self.user.borrow().clone().expect("user configured");
        let id = self.add_comment(repo, number, user, body);
        Ok(self
            .comments_on(repo, number)
            .into_iter()
            .find(|c| c.id == id)
            .expect("comment just added"))
    }

    fn edit_comment(&self, repo: &RepoRef, comment_id: u64, body: &str) -> Result<IssueComment, ApiError> {
        self.record(format!("edit_comment {comment_id}"));
        let mut comments = self.comments.borrow_mut();
        let comment = comments
            .iter_mut()
            .filter(|((r, _), _)| r == repo)
            .flat_map(|(_, cs)| cs.iter_mut())
            .find(|c| c.id == comment_id)
            .ok_or_else(|| not_found(Service::Github, "edit comment"))?;
        comment.body = body.to_string();
        Ok(comment.clone())
    }

    fn add_issue_labels(&self, repo: &RepoRef, number: u64, labels: &[String]) -> Result<(), ApiError> {
        self.record(format!("add_labels {repo}#{number} [{}]", labels.join(",")));
        self.with_issue(repo, number, |issue| {
            for name in labels {
                if !issue.has_label(name) {
                    issue.labels.push(GithubLabel {
                        id: 0,
                        name: name.clone(),
                        color: String::new(),
                    });
                }
            }
        })
        .ok_or_else(|| not_found(Service::Github, "add labels"))
    }

    fn remove_issue_label(&self, repo: &RepoRef, number: u64, label: &str) -> Result<(), ApiError> {
        self.record(format!("remove_label {repo}#{number} {label}"));
        if self.failing_label_removals.get() {
            return Err(server_error(Service::Github, "remove label"));
        }
        let removed = self
            .with_issue(repo, number, |issue| {
                let before = issue.labels.len();
                issue.labels.retain(|l| l.name != label);
                before != issue.labels.len()
            })
            .unwrap_or(false);
        if removed {
            Ok(())
        } else {
            Err(not_found(Service::Github, "remove label"))
        }
    }

    fn set_issue_state(&self, repo: &RepoRef, number: u64, state: IssueState) -> Result<(), ApiError> {
        self.record(format!("set_state {repo}#{number} {state:?}"));
        self.with_issue(repo, number, |issue| issue.state = state)
            .ok_or_else(|| not_found(Service::Github, "edit issue"))
    }

    fn rate_limit_remaining(&self) -> Option<u32> {
        Some(4999)
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct TrackerState {
    pub stories: RefCell<Vec<Story>>,
    pub labels: RefCell<Vec<TrackerLabel>>,
    pub fail_deletes: Cell<bool>,
    pub writes: RefCell<Vec<String>>,
    next_id: Cell<u64>,
}

#[derive(Clone, Default)]
pub struct FakeTracker(Rc<TrackerState>);

impl Deref for FakeTracker {
    type Target = TrackerState;

    fn deref(&self) -> &TrackerState {
        &self.0
    }
}

impl FakeTracker {
    pub fn new() -> Self {
        let tracker = Self::default();
        tracker.next_id.set(1000);
        tracker
    }

    pub fn add_story(&self, story: Story) {
        self.stories.borrow_mut().push(story);
    }

    pub fn stories_with_label(&self, label: &str) -> Vec<Story> {
        self.stories
            .borrow()
            .iter()
            .filter(|s| s.has_label(label))
            .cloned()
            .collect()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.borrow().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.borrow_mut().clear();
    }

    fn record(&self, write: String) {
        self.writes.borrow_mut().push(write);
    }

    fn next(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn update(&self, story_id: u64, f: impl FnOnce(&mut Story)) -> Result<Story, ApiError> {
        let mut stories = self.stories.borrow_mut();
        let story = stories
            .iter_mut()
            .find(|s| s.id == story_id)
            .ok_or_else(|| not_found(Service::Tracker, "update story"))?;
        f(story);
        Ok(story.clone())
    }
}

impl TrackerApi for FakeTracker {
    fn stories(&self, query: &StoriesQuery) -> Result<Vec<Story>, ApiError> {
        Ok(self
            .stories
            .borrow()
            .iter()
            .filter(|s| {
                query.label.as_deref().map_or(true, |l| {
                    s.labels.iter().any(|x| x.name.eq_ignore_ascii_case(l))
                })
            })
            .cloned()
            .collect())
    }

    fn create_story(&self, new: &NewStory) -> Result<Story, ApiError> {
        self.record(format!("create_story {}", new.name));
        let id = self.next();
        let story = Story {
            id,
            url: format!("https://www.pivotaltracker.com/story/show/{id}"),
            name: new.name.clone(),
            description: Some(new.description.clone()),
            story_type: new.story_type,
            state: new.state.clone(),
            labels: new
                .labels
                .iter()
                .map(|l| TrackerLabel {
                    id: self.next(),
                    name: l.name.clone(),
                    counts: None,
                })
                .collect(),
            accepted_at: None,
        };
        self.stories.borrow_mut().push(story.clone());
        Ok(story)
    }

    fn delete_story(&self, story_id: u64) -> Result<(), ApiError> {
        self.record(format!("delete_story {story_id}"));
        if self.fail_deletes.get() {
            return Err(server_error(Service::Tracker, "delete story"));
        }
        self.stories.borrow_mut().retain(|s| s.id != story_id);
        Ok(())
    }

    fn set_story_type(&self, story_id: u64, story_type: StoryType) -> Result<Story, ApiError> {
        self.record(format!("set_type {story_id} {story_type}"));
        self.update(story_id, |s| s.story_type = story_type)
    }

    fn set_story_name(&self, story_id: u64, name: &str) -> Result<Story, ApiError> {
        self.record(format!("set_name {story_id} {name}"));
        self.update(story_id, |s| s.name = name.to_string())
    }

    fn unschedule_story(&self, story_id: u64) -> Result<Story, ApiError> {
        self.record(format!("unschedule {story_id}"));
        self.update(story_id, |s| s.state = StoryState::Unscheduled)
    }

    fn add_story_label(&self, story_id: u64, name: &str) -> Result<TrackerLabel, ApiError> {
        self.record(format!("add_story_label {story_id} {name}"));
        let label = TrackerLabel {
            id: self.next(),
            name: name.to_string(),
            counts: None,
        };
        let added = label.clone();
        self.update(story_id, move |s| s.labels.push(added))?;
        Ok(label)
    }

    fn remove_story_label(&self, story_id: u64, label_id: u64) -> Result<(), ApiError> {
        self.record(format!("remove_story_label {story_id} {label_id}"));
        self.update(story_id, |s| s.labels.retain(|l| l.id != label_id))?;
        Ok(())
    }

    fn labels(&self) -> Result<Vec<TrackerLabel>, ApiError> {
        Ok(self.labels.borrow().clone())
    }

    fn delete_label(&self, label_id: u64) -> Result<(), ApiError> {
        self.record(format!("delete_label {label_id}"));
        if self.fail_deletes.get() {
            return Err(server_error(Service::Tracker, "delete label"));
        }
        self.labels.borrow_mut().retain(|l| l.id != label_id);
        Ok(())
    }
}
