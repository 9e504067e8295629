//! tracksync client library: blocking HTTP implementations of the
//! [`GithubApi`](tracksync_core::GithubApi) and
//! [`TrackerApi`](tracksync_core::TrackerApi) traits.
//!
//! - [`github`]: GitHub REST v3, `Link`-header pagination, rate-limit capture
//! - [`tracker`]: Pivotal Tracker v5, offset pagination
//! - [`pagination`]: [`collect_pages`] shared by both

pub mod github;
mod http;
pub mod pagination;
pub mod tracker;

pub use github::{GithubClient, DEFAULT_GITHUB_URL};
pub use pagination::{collect_pages, Cursor, Page};
pub use tracker::{TrackerClient, DEFAULT_TRACKER_URL};
