use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use dk_schemas::{ReconciliationOverride, SubmarketCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One weekly weighted average from the forecast feed, submarket already
/// resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPoint {
    pub submarket: SubmarketCode,
    pub week_start: NaiveDate,
    pub weighted_average: f64,
}

type Cell = (SubmarketCode, i32, u32);

/// Monthly override values keyed by (submarket, year, month).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideSeries {
    cells: BTreeMap<Cell, f64>,
}

impl OverrideSeries {
    /// Average weekly points into monthly values.
    ///
    /// A week belongs to the calendar month its start date falls in. The
    /// monthly mean is rounded to the nearest integer (halves away from
    /// zero). FC points are ignored.
    pub fn from_weekly(points: &[WeeklyPoint]) -> Self {
        let mut acc: BTreeMap<Cell, (f64, usize)> = BTreeMap::new();
        let mut skipped_fc = 0usize;

        for p in points {
            if !p.submarket.is_load_bearing() {
                skipped_fc += 1;
                continue;
            }
            let e = acc
                .entry((p.submarket, p.week_start.year(), p.week_start.month()))
                .or_insert((0.0, 0));
            e.0 += p.weighted_average;
            e.1 += 1;
        }
        if skipped_fc > 0 {
            debug!(skipped_fc, "override series: FC points ignored");
        }

        let cells = acc
            .into_iter()
            .map(|(k, (sum, n))| (k, (sum / n as f64).round()))
            .collect();
        Self { cells }
    }

    /// Build from already-monthly overrides. A repeated cell keeps the last value.
    pub fn from_overrides(overrides: &[ReconciliationOverride]) -> Self {
        let cells = overrides
            .iter()
            .map(|o| ((o.submarket, o.year, o.month), o.weighted_value))
            .collect();
        Self { cells }
    }

    pub fn get(&self, submarket: SubmarketCode, year: i32, month: u32) -> Option<f64> {
        self.cells.get(&(submarket, year, month)).copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Overrides in (submarket, year, month) order.
    pub fn overrides(&self) -> Vec<ReconciliationOverride> {
        self.cells
            .iter()
            .map(|(&(submarket, year, month), &weighted_value)| ReconciliationOverride {
                submarket,
                year,
                month,
                weighted_value,
            })
            .collect()
    }

    pub(crate) fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.keys()
    }
}
