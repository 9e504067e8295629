//! tracksync core library: domain types, stock labels, collaborator traits,
//! errors and the on-disk config file.
//!
//! - [`types`]: GitHub and Tracker resources, closed state enums
//! - [`labels`]: stock label table, `NAME:COLOR` label specs
//! - [`repo_set`]: repository allow-list
//! - [`api`]: [`GithubApi`] / [`TrackerApi`] collaborator traits
//! - [`config`]: `~/.tracksync/config.yaml` load / save / init
//! - [`error`]: [`ApiError`], [`ConfigError`]

pub mod api;
pub mod config;
pub mod error;
pub mod labels;
pub mod repo_set;
pub mod types;

pub use api::{GithubApi, StoriesQuery, TrackerApi};
pub use config::{ConfigFile, GcConfig, Settings};
pub use error::{ApiError, ConfigError, Service};
pub use labels::{LabelSpec, StockLabel, HAS_PR_LABEL};
pub use repo_set::RepoSet;
pub use types::{
    GithubLabel, Issue, IssueComment, IssueState, LinkLabel, NewLabel, NewStory, RepoRef,
    Repository, Story, StoryState, StoryType, TrackerLabel, User,
};
