//! Template contexts: serializable rendering payloads built from stories and issues.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tracksync_core::types::{Issue, LinkLabel, Story};

use crate::error::RenderError;

/// One checklist line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryCtx {
    pub id: u64,
    pub url: String,
    pub name: String,
    pub accepted: bool,
}

impl From<&Story> for StoryCtx {
    fn from(story: &Story) -> Self {
        StoryCtx {
            id: story.id,
            url: story.url.clone(),
            name: story.name.clone(),
            accepted: story.is_accepted(),
        }
    }
}

/// Payload of the status and closing comments.
#[derive(Debug, Clone, Serialize)]
pub struct StoryListContext {
    pub stories: Vec<StoryCtx>,
}

impl StoryListContext {
    pub fn from_stories(stories: &[Story]) -> Self {
        StoryListContext {
            stories: stories.iter().map(StoryCtx::from).collect(),
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

/// What happened to the issue, as credited in a story description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueEvent {
    Opened,
    Reopened,
}

/// Payload of a story description.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptionContext {
    pub verb: IssueEvent,
    pub login: String,
    pub user_url: String,
    pub link: String,
    pub issue_url: String,
    /// `January 2` style day, no year.
    pub date: String,
}

impl DescriptionContext {
    /// `opened` credits `created_at`; `reopened` credits `updated_at`.
    pub fn new(event: IssueEvent, issue: &Issue, link: &LinkLabel) -> Self {
        let at = match event {
            IssueEvent::Opened => issue.created_at,
            IssueEvent::Reopened => issue.updated_at,
        };
        DescriptionContext {
            verb: event,
            login: issue.user.login.clone(),
            user_url: issue.user.html_url.clone(),
            link: link.to_string(),
            issue_url: issue.html_url.clone(),
            date: month_day(at),
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

fn month_day(at: DateTime<Utc>) -> String {
    at.format("%B %-d").to_string()
}
