//! Subcommands and the connection flags they share.

pub mod gc_labels;
pub mod init;
pub mod status;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use tracksync_client::{GithubClient, TrackerClient};
use tracksync_core::{config, ConfigFile, GcConfig, LabelSpec, Settings};
use tracksync_sync::SyncOptions;

/// Credentials and scope. Each flag falls back to its environment variable,
/// then to the config file.
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// Config file to read instead of ~/.tracksync/config.yaml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// GitHub API token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// GitHub API base URL, for GitHub Enterprise.
    #[arg(long, env = "GITHUB_URL", value_name = "URL")]
    pub github_url: Option<String>,

    /// GitHub organization (or user) whose repositories are synced.
    #[arg(long, env = "GITHUB_ORGANIZATION")]
    pub organization: Option<String>,

    /// Pivotal Tracker API token.
    #[arg(long, env = "TRACKER_TOKEN", hide_env_values = true)]
    pub tracker_token: Option<String>,

    /// Pivotal Tracker project ID.
    #[arg(long, env = "TRACKER_PROJECT_ID", value_name = "ID")]
    pub project_id: Option<u64>,

    /// Only sync this repository; repeat or comma-separate for several.
    #[arg(long = "repository", value_name = "NAME")]
    pub repositories: Vec<String>,

    /// Extra label to keep on every repository, as NAME:COLOR.
    #[arg(long = "label", value_name = "NAME:COLOR")]
    pub labels: Vec<LabelSpec>,
}

impl ConnectionArgs {
    /// Flag and environment values as a config layer.
    fn overrides(&self, gc: GcConfig) -> ConfigFile {
        ConfigFile {
            github_token: self.github_token.clone(),
            github_url: self.github_url.clone(),
            organization: self.organization.clone(),
            tracker_token: self.tracker_token.clone(),
            project_id: self.project_id,
            repositories: self.repositories.clone(),
            labels: self
                .labels
                .iter()
                .map(|l| (l.name.clone(), l.color.clone()))
                .collect(),
            gc,
        }
    }

    /// Config file with flags and environment layered on top.
    pub fn merged(&self, gc: GcConfig) -> Result<ConfigFile> {
        let file = match &self.config {
            Some(path) => config::load_from(path),
            None => config::load(),
        }
        .context("failed to load config")?;
        Ok(file.merge(self.overrides(gc)))
    }

    pub fn settings(&self, gc: GcConfig) -> Result<Settings> {
        Ok(self.merged(gc)?.into_settings()?)
    }
}

pub fn github_client(settings: &Settings) -> GithubClient {
    GithubClient::new(settings.github_token.clone(), settings.github_url.as_deref())
}

pub fn tracker_client(settings: &Settings) -> TrackerClient {
    TrackerClient::new(settings.tracker_token.clone(), settings.project_id)
}

pub fn sync_options(settings: &Settings) -> SyncOptions {
    SyncOptions {
        organization: settings.organization.clone(),
        repositories: settings.repositories.clone(),
        labels: settings.labels.clone(),
    }
}
