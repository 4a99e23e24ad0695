//! Pivot and element-wise difference.
//!
//! Month columns stay numeric (1..=12) here. Labels are a render concern.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use dk_schemas::{DiffCell, NormalizedRow, SubmarketCode};
use serde::Serialize;
use tracing::debug;

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

/// What the matrix rows are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Axis {
    /// One row per submarket, for one year.
    Submarket { year: i32 },
    /// One row per year, for one submarket; `None` is the system total
    /// (FC excluded).
    Year { submarket: Option<SubmarketCode> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RowLabel {
    Submarket(SubmarketCode),
    Year(i32),
}

impl fmt::Display for RowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowLabel::Submarket(s) => write!(f, "{s}"),
            RowLabel::Year(y) => write!(f, "{y}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Pivot
// ---------------------------------------------------------------------------

/// Wide table: rows by [`RowLabel`], columns by month number.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub axis: Axis,
    cells: BTreeMap<RowLabel, BTreeMap<u32, f64>>,
}

impl Matrix {
    pub fn get(&self, label: RowLabel, month: u32) -> Option<f64> {
        self.cells.get(&label).and_then(|r| r.get(&month)).copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = &RowLabel> {
        self.cells.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Pivot `rows` on `metric` along `axis`.
///
/// FC rows never contribute. A total (`Year { submarket: None }`) sums the
/// sources of each (year, month): the four load-bearing submarkets, plus rows
/// that carry no submarket. Once any submarket appears in a cell, the cell is
/// defined only if all four contributed; a cell fed only by rows without a
/// submarket is defined when such a row is present. Rows without the metric
/// contribute nothing.
pub fn pivot(rows: &[NormalizedRow], metric: &str, axis: Axis) -> Matrix {
    pivot_rows(rows, metric, axis)
}

/// Running sum of one cell and the sources that fed it.
#[derive(Default)]
struct CellAcc {
    sum: f64,
    sources: BTreeSet<Option<SubmarketCode>>,
}

impl CellAcc {
    fn is_complete_total(&self) -> bool {
        let any_submarket = self.sources.iter().any(Option::is_some);
        !any_submarket
            || SubmarketCode::LOAD_BEARING
                .iter()
                .all(|sm| self.sources.contains(&Some(*sm)))
    }
}

pub(crate) fn pivot_rows<'a>(
    rows: impl IntoIterator<Item = &'a NormalizedRow>,
    metric: &str,
    axis: Axis,
) -> Matrix {
    let mut acc: BTreeMap<RowLabel, BTreeMap<u32, CellAcc>> = BTreeMap::new();
    let mut skipped = 0usize;

    for row in rows {
        if row.submarket == Some(SubmarketCode::Fc) {
            continue;
        }
        let Some(value) = row.metric(metric) else {
            skipped += 1;
            continue;
        };
        let label = match axis {
            Axis::Submarket { year } => match row.submarket {
                Some(sm) if row.year == year => RowLabel::Submarket(sm),
                _ => continue,
            },
            Axis::Year { submarket: Some(sm) } if row.submarket == Some(sm) => {
                RowLabel::Year(row.year)
            }
            Axis::Year { submarket: Some(_) } => continue,
            Axis::Year { submarket: None } => RowLabel::Year(row.year),
        };
        let cell = acc.entry(label).or_default().entry(row.month).or_default();
        cell.sum += value;
        cell.sources.insert(row.submarket);
    }

    let total = matches!(axis, Axis::Year { submarket: None });
    let mut incomplete = 0usize;
    let mut cells: BTreeMap<RowLabel, BTreeMap<u32, f64>> = BTreeMap::new();
    for (label, months) in acc {
        let row = cells.entry(label).or_default();
        for (month, cell) in months {
            if total && !cell.is_complete_total() {
                incomplete += 1;
                continue;
            }
            row.insert(month, cell.sum);
        }
    }

    if skipped > 0 {
        debug!(metric, skipped, "pivot: rows without metric left undefined");
    }
    if incomplete > 0 {
        debug!(metric, incomplete, "pivot: totals missing a submarket left undefined");
    }
    Matrix { axis, cells }
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffRow {
    pub label: RowLabel,
    /// Index 0 is January. `None` when either operand lacks the cell.
    pub months: [Option<f64>; 12],
    /// Mean over the defined months; `None` when no month is defined.
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffMatrix {
    pub axis: Axis,
    pub rows: Vec<DiffRow>,
}

impl DiffMatrix {
    /// Every defined cell as a [`DiffCell`].
    pub fn cells(&self) -> impl Iterator<Item = DiffCell> + '_ {
        let axis = self.axis;
        self.rows.iter().flat_map(move |r| {
            r.months.iter().enumerate().filter_map(move |(i, d)| {
                let delta = (*d)?;
                let (submarket, year) = match (axis, r.label) {
                    (Axis::Submarket { year }, RowLabel::Submarket(sm)) => (Some(sm), year),
                    (Axis::Year { submarket }, RowLabel::Year(y)) => (submarket, y),
                    _ => return None,
                };
                Some(DiffCell {
                    submarket,
                    year,
                    month: i as u32 + 1,
                    delta,
                })
            })
        })
    }

    pub fn row(&self, label: RowLabel) -> Option<&DiffRow> {
        self.rows.iter().find(|r| r.label == label)
    }
}

/// `current - prior`, aligned on the union of row labels and months 1..=12.
pub fn diff(current: &Matrix, prior: &Matrix) -> DiffMatrix {
    let labels: BTreeSet<RowLabel> = current.labels().chain(prior.labels()).copied().collect();

    let rows = labels
        .into_iter()
        .map(|label| {
            let mut months = [None; 12];
            for (i, slot) in months.iter_mut().enumerate() {
                let m = i as u32 + 1;
                if let (Some(c), Some(p)) = (current.get(label, m), prior.get(label, m)) {
                    *slot = Some(c - p);
                }
            }
            let defined: Vec<f64> = months.iter().flatten().copied().collect();
            let mean = if defined.is_empty() {
                None
            } else {
                Some(defined.iter().sum::<f64>() / defined.len() as f64)
            };
            DiffRow {
                label,
                months,
                mean,
            }
        })
        .collect();

    DiffMatrix {
        axis: current.axis,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dk_schemas::{columns, Entity, Version};

    fn row(sm: SubmarketCode, y: i32, m: u32, v: f64) -> NormalizedRow {
        NormalizedRow::new(
            Entity::Sistema,
            Some(sm),
            y,
            m,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            Version::Preliminar,
        )
        .with_metric(columns::GERACAO_EOL, v)
    }

    #[test]
    fn submarket_axis_filters_year() {
        let rows = vec![row(SubmarketCode::Se, 2025, 1, 10.0), row(SubmarketCode::Se, 2026, 1, 99.0)];
        let m = pivot(&rows, columns::GERACAO_EOL, Axis::Submarket { year: 2025 });
        assert_eq!(m.get(RowLabel::Submarket(SubmarketCode::Se), 1), Some(10.0));
        assert_eq!(m.labels().count(), 1);
    }

    #[test]
    fn total_excludes_fc() {
        let rows = vec![
            row(SubmarketCode::Se, 2025, 1, 10.0),
            row(SubmarketCode::S, 2025, 1, 2.0),
            row(SubmarketCode::Ne, 2025, 1, 3.0),
            row(SubmarketCode::N, 2025, 1, 5.0),
            row(SubmarketCode::Fc, 2025, 1, 1_000.0),
        ];
        let m = pivot(&rows, columns::GERACAO_EOL, Axis::Year { submarket: None });
        assert_eq!(m.get(RowLabel::Year(2025), 1), Some(20.0));
    }

    #[test]
    fn total_missing_a_submarket_is_undefined() {
        let rows = vec![
            row(SubmarketCode::Se, 2025, 1, 10.0),
            row(SubmarketCode::N, 2025, 1, 5.0),
        ];
        let m = pivot(&rows, columns::GERACAO_EOL, Axis::Year { submarket: None });
        assert_eq!(m.get(RowLabel::Year(2025), 1), None);
    }

    #[test]
    fn total_of_rows_without_submarket_is_defined() {
        let cadic = |m, v| {
            NormalizedRow::new(
                Entity::Cadic,
                None,
                2025,
                m,
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                Version::Preliminar,
            )
            .with_metric(columns::ANDE, v)
        };
        let m = pivot(&[cadic(1, 7.0), cadic(2, 8.0)], columns::ANDE, Axis::Year { submarket: None });
        assert_eq!(m.get(RowLabel::Year(2025), 1), Some(7.0));
        assert_eq!(m.get(RowLabel::Year(2025), 2), Some(8.0));
    }

    #[test]
    fn row_without_metric_does_not_count_as_a_source() {
        let mut rows: Vec<NormalizedRow> = SubmarketCode::LOAD_BEARING
            .iter()
            .map(|sm| row(*sm, 2025, 4, 1.0))
            .collect();
        rows[0] = NormalizedRow::new(
            Entity::Sistema,
            Some(SubmarketCode::Se),
            2025,
            4,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            Version::Preliminar,
        );
        let m = pivot(&rows, columns::GERACAO_EOL, Axis::Year { submarket: None });
        assert_eq!(m.get(RowLabel::Year(2025), 4), None);
    }

    #[test]
    fn missing_month_is_undefined_not_zero() {
        let cur = pivot(
            &[row(SubmarketCode::S, 2025, 1, 10.0), row(SubmarketCode::S, 2025, 2, 20.0)],
            columns::GERACAO_EOL,
            Axis::Submarket { year: 2025 },
        );
        let prior = pivot(
            &[row(SubmarketCode::S, 2025, 1, 4.0)],
            columns::GERACAO_EOL,
            Axis::Submarket { year: 2025 },
        );
        let d = diff(&cur, &prior);
        let r = d.row(RowLabel::Submarket(SubmarketCode::S)).unwrap();
        assert_eq!(r.months[0], Some(6.0));
        assert_eq!(r.months[1], None);
        assert_eq!(r.mean, Some(6.0));
        assert_eq!(d.cells().count(), 1);
    }

    #[test]
    fn label_present_in_one_operand_only_has_no_mean() {
        let cur = pivot(&[row(SubmarketCode::Ne, 2025, 3, 1.0)], columns::GERACAO_EOL, Axis::Submarket { year: 2025 });
        let prior = pivot(&[], columns::GERACAO_EOL, Axis::Submarket { year: 2025 });
        let d = diff(&cur, &prior);
        assert_eq!(d.rows.len(), 1);
        assert_eq!(d.rows[0].mean, None);
    }
}
