//! Tera rendering engine: [`Renderer`] for issue comments and story descriptions.
//!
//! | Output               | Template                     |
//! |----------------------|------------------------------|
//! | status comment       | `status_comment.md.tera`     |
//! | closing comment      | `closed_comment.md.tera`     |
//! | story description    | `story_description.md.tera`  |

use tera::Tera;

use tracksync_core::types::{Issue, LinkLabel, Story};

use crate::context::{DescriptionContext, IssueEvent, StoryListContext};
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates: baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const STATUS_COMMENT: &str = "status_comment.md.tera";
const CLOSED_COMMENT: &str = "closed_comment.md.tera";
const STORY_DESCRIPTION: &str = "story_description.md.tera";

/// First line of every status comment.
const STATUS_HEADER: &str = "Hi there!";

const TPLS: &[(&str, &str)] = &[
    (STATUS_COMMENT, include_str!("templates/status_comment.md.tera")),
    (CLOSED_COMMENT, include_str!("templates/closed_comment.md.tera")),
    (STORY_DESCRIPTION, include_str!("templates/story_description.md.tera")),
];

/// Renders every text the synchronizer writes. Create once and reuse.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TPLS.iter().copied())?;
        Ok(Renderer { tera })
    }

    /// Checklist of `stories`, checked when accepted.
    pub fn status_comment(&self, stories: &[Story]) -> Result<String, RenderError> {
        let ctx = StoryListContext::from_stories(stories).to_tera_context()?;
        Ok(self.tera.render(STATUS_COMMENT, &ctx)?)
    }

    /// Whether `body` was rendered by [`Renderer::status_comment`].
    pub fn is_status_comment(&self, body: &str) -> bool {
        body.starts_with(STATUS_HEADER)
    }

    /// Comment posted right before an issue is closed.
    pub fn closed_comment(&self, stories: &[Story]) -> Result<String, RenderError> {
        let ctx = StoryListContext::from_stories(stories).to_tera_context()?;
        Ok(self.tera.render(CLOSED_COMMENT, &ctx)?)
    }

    pub fn opened_description(&self, issue: &Issue, link: &LinkLabel) -> Result<String, RenderError> {
        self.description(IssueEvent::Opened, issue, link)
    }

    pub fn reopened_description(
        &self,
        issue: &Issue,
        link: &LinkLabel,
    ) -> Result<String, RenderError> {
        self.description(IssueEvent::Reopened, issue, link)
    }

    fn description(
        &self,
        event: IssueEvent,
        issue: &Issue,
        link: &LinkLabel,
    ) -> Result<String, RenderError> {
        let ctx = DescriptionContext::new(event, issue, link).to_tera_context()?;
        Ok(self.tera.render(STORY_DESCRIPTION, &ctx)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_new_succeeds() {
        Renderer::new().expect("Renderer::new should succeed with embedded templates");
    }

    #[test]
    fn empty_story_list_renders() {
        let renderer = Renderer::new().expect("renderer");
        let body = renderer.status_comment(&[]).expect("render");
        assert!(body.starts_with("Hi there!"));
        assert!(!body.contains("* ["));
    }

    #[test]
    fn closing_comment_is_not_a_status_comment() {
        let renderer = Renderer::new().expect("renderer");
        let status = renderer.status_comment(&[]).expect("status");
        let closed = renderer.closed_comment(&[]).expect("closed");
        assert!(renderer.is_status_comment(&status));
        assert!(!renderer.is_status_comment(&closed));
        assert!(!renderer.is_status_comment("thanks for the report"));
    }

    #[test]
    fn no_crlf_in_rendered_output() {
        let renderer = Renderer::new().expect("renderer");
        for body in [
            renderer.status_comment(&[]).expect("status"),
            renderer.closed_comment(&[]).expect("closed"),
        ] {
            assert!(!body.contains('\r'));
        }
    }
}
