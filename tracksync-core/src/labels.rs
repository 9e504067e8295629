//! Stock label table and caller-supplied `NAME:COLOR` declarations.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Tracker label marking stories whose issue is a pull request.
pub const HAS_PR_LABEL: &str = "has-pr";

/// Labels the synchronizer owns on the GitHub side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockLabel {
    Unscheduled,
    Scheduled,
    InFlight,
    Bug,
    Enhancement,
    Proposal,
}

impl StockLabel {
    pub const ALL: [StockLabel; 6] = [
        StockLabel::Unscheduled,
        StockLabel::Scheduled,
        StockLabel::InFlight,
        StockLabel::Bug,
        StockLabel::Enhancement,
        StockLabel::Proposal,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StockLabel::Unscheduled => "unscheduled",
            StockLabel::Scheduled => "scheduled",
            StockLabel::InFlight => "in-flight",
            StockLabel::Bug => "bug",
            StockLabel::Enhancement => "enhancement",
            StockLabel::Proposal => "proposal",
        }
    }

    /// Canonical color. Empty means keep whatever GitHub already has.
    pub fn color(&self) -> &'static str {
        match self {
            StockLabel::Unscheduled => "e4eff7",
            StockLabel::Scheduled => "f4f4f4",
            StockLabel::InFlight => "f3f3d1",
            StockLabel::Proposal => "c2e0c6",
            StockLabel::Bug | StockLabel::Enhancement => "",
        }
    }

    /// Managed labels are derived from stories and may be removed from issues.
    /// `proposal` is issue-only and never touched after bootstrap.
    pub fn is_managed(&self) -> bool {
        !matches!(self, StockLabel::Proposal)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.name() == name)
    }

    pub fn managed() -> impl Iterator<Item = StockLabel> {
        Self::ALL.into_iter().filter(StockLabel::is_managed)
    }
}

impl fmt::Display for StockLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `true` if `name` is a managed stock label.
pub fn is_managed_label(name: &str) -> bool {
    StockLabel::from_name(name).is_some_and(|l| l.is_managed())
}

/// Strip a leading `#` and lowercase, so `#E4EFF7` compares equal to `e4eff7`.
pub fn normalize_color(color: &str) -> String {
    color.trim().trim_start_matches('#').to_ascii_lowercase()
}

/// An extra label to keep present on every synced repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSpec {
    pub name: String,
    /// Normalized hex color; empty to respect the existing color.
    pub color: String,
}

impl LabelSpec {
    pub fn new(name: impl Into<String>, color: &str) -> Result<Self, ConfigError> {
        let name = name.into();
        let color = normalize_color(color);
        let valid_color = color.is_empty()
            || (color.len() == 6 && color.chars().all(|c| c.is_ascii_hexdigit()));
        if name.trim().is_empty() || !valid_color {
            return Err(ConfigError::InvalidLabel(format!("{name}:{color}")));
        }
        Ok(Self { name, color })
    }
}

impl FromStr for LabelSpec {
    type Err = ConfigError;

    /// `NAME:COLOR`; the color half may be empty (`NAME:`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, color) = s
            .rsplit_once(':')
            .ok_or_else(|| ConfigError::InvalidLabel(s.to_string()))?;
        LabelSpec::new(name, color).map_err(|_| ConfigError::InvalidLabel(s.to_string()))
    }
}

impl fmt::Display for LabelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.color)
    }
}

/// Stock labels plus `additional`, name → normalized color.
/// An additional declaration overrides the stock color of the same name.
pub fn canonical_labels(additional: &[LabelSpec]) -> BTreeMap<String, String> {
    let mut labels: BTreeMap<String, String> = StockLabel::ALL
        .iter()
        .map(|l| (l.name().to_string(), l.color().to_string()))
        .collect();
    for spec in additional {
        labels.insert(spec.name.clone(), spec.color.clone());
    }
    labels
}
