//! # tracksync-sync
//!
//! Issue ↔ story reconciliation.
//!
//! Build a [`Syncer`] over any [`GithubApi`](tracksync_core::GithubApi) and
//! [`TrackerApi`](tracksync_core::TrackerApi) pair and call
//! [`Syncer::sync_issues_and_stories`]. Wrap the clients in [`DryRunGithub`]
//! and [`DryRunTracker`] to preview a run, and use [`collect_garbage`] to
//! clean up Tracker labels nothing refers to anymore.

pub mod chore;
pub mod dry_run;
pub mod error;
pub mod label_gc;
pub mod labels;
pub mod status;
pub mod story_set;
pub mod syncer;

pub use dry_run::{DryRunGithub, DryRunTracker};
pub use error::{IssueFailure, SyncError};
pub use label_gc::{collect_garbage, GcMode, GcReport};
pub use labels::{ensure_stock_labels, BootstrapReport, LabelChanges};
pub use status::IssueStatus;
pub use story_set::StorySet;
pub use syncer::{SyncOptions, SyncSummary, Syncer};
