//! The stories linked to one issue, and the GitHub labels they imply.

use chrono::{DateTime, Utc};

use tracksync_core::types::{Story, StoryState, StoryType};
use tracksync_core::StockLabel;

use crate::error::SyncError;

/// Every story carrying one link label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorySet {
    stories: Vec<Story>,
}

impl StorySet {
    pub fn new(stories: Vec<Story>) -> Self {
        Self { stories }
    }

    /// Keep the story with the lowest ID; return it as a set plus the rest.
    pub fn dedupe(mut self) -> (StorySet, Vec<Story>) {
        self.stories.sort_by_key(|s| s.id);
        let mut rest = self.stories;
        let kept: Vec<Story> = if rest.is_empty() {
            Vec::new()
        } else {
            vec![rest.remove(0)]
        };
        (StorySet::new(kept), rest)
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Story> {
        self.stories.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Story> {
        self.stories.iter_mut()
    }

    pub fn as_slice(&self) -> &[Story] {
        &self.stories
    }

    pub fn push(&mut self, story: Story) {
        self.stories.push(story);
    }

    /// Every member accepted. Vacuously true for an empty set.
    pub fn all_accepted(&self) -> bool {
        self.stories.iter().all(Story::is_accepted)
    }

    /// Latest `accepted_at`, or the Unix epoch when nothing was accepted.
    pub fn last_accepted(&self) -> DateTime<Utc> {
        self.stories
            .iter()
            .filter_map(|s| s.accepted_at)
            .max()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Every member is still in the icebox.
    pub fn unscheduled(&self) -> bool {
        self.stories
            .iter()
            .all(|s| s.state == StoryState::Unscheduled)
    }

    /// Every member is still a chore, i.e. nobody has picked a type by hand.
    pub fn untriaged(&self) -> bool {
        self.stories.iter().all(|s| s.story_type == StoryType::Chore)
    }

    pub fn has_pr(&self) -> bool {
        self.stories.iter().any(Story::has_pr)
    }

    /// GitHub labels reflecting the set: an optional type label followed by
    /// one status label, unless everything is accepted.
    pub fn issue_labels(&self) -> Result<Vec<String>, SyncError> {
        let mut labels = Vec::new();

        if self.stories.iter().any(|s| s.story_type == StoryType::Feature) {
            labels.push(StockLabel::Enhancement.name().to_string());
        } else if self.stories.iter().any(|s| s.story_type == StoryType::Bug) {
            labels.push(StockLabel::Bug.name().to_string());
        }

        if self.all_accepted() {
            return Ok(labels);
        }

        let mut scheduled = false;
        for story in &self.stories {
            if story.state.is_in_flight() {
                labels.push(StockLabel::InFlight.name().to_string());
                return Ok(labels);
            }
            match &story.state {
                StoryState::Unstarted | StoryState::Planned => scheduled = true,
                StoryState::Unknown(state) => {
                    return Err(SyncError::UnknownStoryState {
                        story_id: story.id,
                        state: state.clone(),
                    })
                }
                _ => {}
            }
        }

        let status = if scheduled {
            StockLabel::Scheduled
        } else {
            StockLabel::Unscheduled
        };
        labels.push(status.name().to_string());
        Ok(labels)
    }
}

impl From<Vec<Story>> for StorySet {
    fn from(stories: Vec<Story>) -> Self {
        Self::new(stories)
    }
}
