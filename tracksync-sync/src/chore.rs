//! Stories created on behalf of an issue.

use tracksync_core::types::{Issue, LinkLabel, NewLabel, NewStory, StoryState, StoryType};
use tracksync_core::HAS_PR_LABEL;
use tracksync_renderer::{RenderError, Renderer};

/// Initial unscheduled chore for an issue with no story yet. Pull requests
/// also get the `has-pr` label.
pub fn new_issue_chore(
    renderer: &Renderer,
    issue: &Issue,
    link: &LinkLabel,
) -> Result<NewStory, RenderError> {
    let mut labels = vec![NewLabel {
        name: link.to_string(),
    }];
    if issue.is_pull_request() {
        labels.push(NewLabel {
            name: HAS_PR_LABEL.to_string(),
        });
    }
    Ok(NewStory {
        name: issue.title.clone(),
        description: renderer.opened_description(issue, link)?,
        story_type: StoryType::Chore,
        state: StoryState::Unscheduled,
        labels,
    })
}

/// Follow-up chore for an issue that moved after all its stories were accepted.
pub fn reopened_issue_chore(
    renderer: &Renderer,
    issue: &Issue,
    link: &LinkLabel,
) -> Result<NewStory, RenderError> {
    Ok(NewStory {
        name: format!("reopened: {}", issue.title),
        description: renderer.reopened_description(issue, link)?,
        story_type: StoryType::Chore,
        state: StoryState::Unscheduled,
        labels: vec![NewLabel {
            name: link.to_string(),
        }],
    })
}
