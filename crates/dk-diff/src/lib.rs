//! dk-diff
//!
//! Snapshot comparison: pivot two normalized snapshots of the same metric,
//! subtract prior from current cell by cell, and append a row mean.
//!
//! A cell missing from either operand has no difference. It stays undefined
//! through the arithmetic and renders blank; it is never coerced to zero.
//!
//! Pure, no IO.

mod matrix;
mod render;

pub use matrix::{diff, pivot, Axis, DiffMatrix, DiffRow, Matrix, RowLabel};
pub use render::{DiffReport, RenderedTable, SnapshotCaption, MEAN_LABEL, MONTH_LABELS};

use dk_schemas::NormalizedRow;
use tracing::{info, warn};

use crate::matrix::pivot_rows;

/// Compares two snapshots of one metric along one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotDiffEngine {
    metric: String,
    axis: Axis,
}

impl SnapshotDiffEngine {
    pub fn new(metric: impl Into<String>, axis: Axis) -> Self {
        Self {
            metric: metric.into(),
            axis,
        }
    }

    /// `current - prior` with captions attached. Callers reconcile SISTEMA
    /// snapshots before comparing them.
    ///
    /// Each operand is restricted to the rows its caption names; rows of any
    /// other (deck_date, version) in the same input never reach the pivot.
    pub fn compare(
        &self,
        current: &[NormalizedRow],
        current_caption: SnapshotCaption,
        prior: &[NormalizedRow],
        prior_caption: SnapshotCaption,
    ) -> DiffReport {
        let a = pivot_rows(
            select_snapshot(current, &current_caption, "current"),
            &self.metric,
            self.axis,
        );
        let b = pivot_rows(
            select_snapshot(prior, &prior_caption, "prior"),
            &self.metric,
            self.axis,
        );
        let matrix = diff(&a, &b);
        info!(
            metric = %self.metric,
            rows = matrix.rows.len(),
            cells = matrix.cells().count(),
            "snapshot diff"
        );
        DiffReport {
            metric: self.metric.clone(),
            current: current_caption,
            prior: prior_caption,
            matrix,
        }
    }
}

fn select_snapshot<'a>(
    rows: &'a [NormalizedRow],
    caption: &SnapshotCaption,
    side: &'static str,
) -> Vec<&'a NormalizedRow> {
    let kept: Vec<&NormalizedRow> = rows.iter().filter(|r| caption.matches(r)).collect();
    let excluded = rows.len() - kept.len();
    if excluded > 0 {
        warn!(
            side,
            excluded,
            deck_date = %caption.deck_date,
            version = %caption.version,
            "rows from other snapshots excluded from diff"
        );
    }
    kept
}
