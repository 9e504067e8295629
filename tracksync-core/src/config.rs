//! YAML config file and validated run settings.
//!
//! # Storage layout
//!
//! ```text
//! ~/.tracksync/            (mode 0700)
//!   config.yaml            (mode 0600: holds API tokens)
//! ```
//!
//! # API pattern
//!
//! Every filesystem function has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Flags and environment variables arrive as a second [`ConfigFile`] and are
//! layered over the file with [`ConfigFile::merge`]; [`ConfigFile::into_settings`]
//! then checks that every required value is present.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::labels::LabelSpec;
use crate::repo_set::RepoSet;

const CONFIG_TEMPLATE: &str = "\
# tracksync configuration. Command-line flags and environment variables
# override every value here.

# github_token: ghp_xxx
# github_url: https://github.example.com/api/v3/
# organization: acme
# tracker_token: xxx
# project_id: 123456

# Only sync these repositories (default: every public repository).
repositories: []

# Extra labels to keep on every repository, name: color (empty keeps GitHub's color).
labels: {}

gc:
  enabled: false
  delete: false
";

// ---------------------------------------------------------------------------
// 1. Types
// ---------------------------------------------------------------------------

/// Tracker label garbage collection switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcConfig {
    /// Look for tracker labels without stories after syncing.
    pub enabled: bool,
    /// Actually delete them instead of only logging.
    pub delete: bool,
}

/// Raw, possibly partial settings as found in `config.yaml` or on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    pub repositories: Vec<String>,
    pub labels: BTreeMap<String, String>,
    pub gc: GcConfig,
}

/// Fully validated settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub github_token: String,
    pub github_url: Option<String>,
    pub organization: String,
    pub tracker_token: String,
    pub project_id: u64,
    pub repositories: RepoSet,
    pub labels: Vec<LabelSpec>,
    pub gc: GcConfig,
}

impl ConfigFile {
    /// Layer `overrides` on top of `self`. Scalar values in `overrides` win,
    /// a non-empty repository list replaces ours, labels are merged by name
    /// and GC switches are OR-ed.
    pub fn merge(self, overrides: ConfigFile) -> ConfigFile {
        let mut labels = self.labels;
        labels.extend(overrides.labels);
        ConfigFile {
            github_token: overrides.github_token.or(self.github_token),
            github_url: overrides.github_url.or(self.github_url),
            organization: overrides.organization.or(self.organization),
            tracker_token: overrides.tracker_token.or(self.tracker_token),
            project_id: overrides.project_id.or(self.project_id),
            repositories: if overrides.repositories.is_empty() {
                self.repositories
            } else {
                overrides.repositories
            },
            labels,
            gc: GcConfig {
                enabled: self.gc.enabled || overrides.gc.enabled,
                delete: self.gc.delete || overrides.gc.delete,
            },
        }
    }

    /// Validate into [`Settings`], failing on the first missing requirement.
    pub fn into_settings(self) -> Result<Settings, ConfigError> {
        let github_token = required(self.github_token.clone(), "--github-token")?;
        let (tracker_token, project_id) = self.tracker_credentials()?;
        let organization = required(self.organization, "--organization")?;

        let labels = self
            .labels
            .iter()
            .map(|(name, color)| LabelSpec::new(name.clone(), color))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Settings {
            github_token,
            github_url: self.github_url.filter(|u| !u.trim().is_empty()),
            organization,
            tracker_token,
            project_id,
            repositories: self.repositories.iter().collect(),
            labels,
            gc: self.gc,
        })
    }

    /// Tracker token and project ID, for commands that never talk to GitHub.
    pub fn tracker_credentials(&self) -> Result<(String, u64), ConfigError> {
        let token = required(self.tracker_token.clone(), "--tracker-token")?;
        let project_id = self
            .project_id
            .filter(|id| *id != 0)
            .ok_or(ConfigError::Missing("--project-id"))?;
        Ok((token, project_id))
    }
}

fn required(value: Option<String>, flag: &'static str) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(flag))
}

// ---------------------------------------------------------------------------
// 2. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.tracksync/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".tracksync").join("config.yaml")
}

/// `<home>/.tracksync/`, created with mode `0700` if absent.
fn config_dir_at(home: &Path) -> Result<PathBuf, ConfigError> {
    let dir = home.join(".tracksync");
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    Ok(dir)
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// Load an explicitly named config file. Absence is an error.
pub fn load_from(path: &Path) -> Result<ConfigFile, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load `<home>/.tracksync/config.yaml`; a missing file yields defaults.
pub fn load_at(home: &Path) -> Result<ConfigFile, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    load_from(&path)
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<ConfigFile, ConfigError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// 4. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically write `config` to `<home>/.tracksync/config.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, config: &ConfigFile) -> Result<PathBuf, ConfigError> {
    let yaml = serde_yaml::to_string(config)?;
    write_atomic(home, &yaml)
}

fn write_atomic(home: &Path, contents: &str) -> Result<PathBuf, ConfigError> {
    config_dir_at(home)?;
    let path = config_path_at(home);
    let tmp_path = path.with_file_name("config.yaml.tmp");
    std::fs::write(&tmp_path, contents)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// 5. Init
// ---------------------------------------------------------------------------

/// Write a commented config skeleton. Refuses to overwrite unless `force`.
pub fn init_at(home: &Path, force: bool) -> Result<PathBuf, ConfigError> {
    let path = config_path_at(home);
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists { path });
    }
    write_atomic(home, CONFIG_TEMPLATE)
}

/// `init_at` convenience wrapper.
pub fn init(force: bool) -> Result<PathBuf, ConfigError> {
    init_at(&home()?, force)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
