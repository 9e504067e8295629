//! Error types for tracksync-sync.

use std::fmt;

use thiserror::Error;

use tracksync_core::ApiError;
use tracksync_renderer::RenderError;

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A GitHub or Tracker call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// An error from the rendering engine.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// A story is in a state the label derivation does not know. Aborts the run.
    #[error("unknown story state '{state}' on story #{story_id}")]
    UnknownStoryState { story_id: u64, state: String },

    /// Issues or repositories that failed while the rest of the run completed.
    #[error("{} sync failure(s): {}", .0.len(), join_failures(.0))]
    Failures(Vec<IssueFailure>),
}

/// One failed issue (or repository, when its issues could not be listed).
#[derive(Debug)]
pub struct IssueFailure {
    /// Link label, or `owner/name` for repository-level failures.
    pub link: String,
    pub error: SyncError,
}

impl fmt::Display for IssueFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.link, self.error)
    }
}

fn join_failures(failures: &[IssueFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
