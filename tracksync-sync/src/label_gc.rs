//! Tracker label garbage collection.
//!
//! Every issue leaves a link label behind in the Tracker project. Once all
//! stories carrying it are gone the label is dead weight.

use serde::Serialize;

use tracksync_core::types::TrackerLabel;
use tracksync_core::{ApiError, TrackerApi};

/// Whether candidates are only reported or actually deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GcMode {
    #[default]
    DryRun,
    Delete,
}

/// Outcome of one collection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GcReport {
    /// Labels with zero stories in any state.
    pub candidates: Vec<String>,
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
}

/// Labels without counts are skipped: no counts is not the same as no stories.
fn is_candidate(label: &TrackerLabel) -> bool {
    label.counts.is_some() && label.story_count() == 0
}

pub fn collect_garbage<T: TrackerApi + ?Sized>(
    tracker: &T,
    mode: GcMode,
) -> Result<GcReport, ApiError> {
    let mut report = GcReport::default();

    for label in tracker.labels()? {
        if !is_candidate(&label) {
            continue;
        }
        report.candidates.push(label.name.clone());

        match mode {
            GcMode::DryRun => tracing::info!("would delete label: {}", label.name),
            GcMode::Delete => {
                tracing::info!("deleting label: {}", label.name);
                match tracker.delete_label(label.id) {
                    Ok(()) => report.deleted.push(label.name),
                    Err(e) => {
                        tracing::warn!("failed to delete label {}: {e}", label.name);
                        report.failed.push(label.name);
                    }
                }
            }
        }
    }

    Ok(report)
}
