use std::collections::BTreeSet;

use dk_schemas::{columns, Entity, NormalizedRow, SubmarketCode};
use tracing::info;

use crate::series::OverrideSeries;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Which SISTEMA column the override replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerConfig {
    pub target_column: String,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            target_column: columns::GERACAO_EOL.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// One applied override.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideChange {
    pub submarket: SubmarketCode,
    pub year: i32,
    pub month: u32,
    /// Value before the override; `None` if the row had no value.
    pub previous: Option<f64>,
    pub applied: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// SISTEMA rows whose target column was taken from the override.
    pub overridden: usize,
    /// SISTEMA rows with no matching override, left unchanged.
    pub retained: usize,
    /// Non-SISTEMA rows passed through untouched.
    pub passed_through: usize,
    /// Sorted by (submarket, year, month).
    pub changes: Vec<OverrideChange>,
    /// Override cells that matched no row. Sorted.
    pub unused: Vec<(SubmarketCode, i32, u32)>,
}

impl ReconcileReport {
    /// Overrides applied whose value actually differs from the row's.
    pub fn changed_values(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| c.previous != Some(c.applied))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    pub rows: Vec<NormalizedRow>,
    pub report: ReconcileReport,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ForecastReconciler {
    config: ReconcilerConfig,
}

impl ForecastReconciler {
    pub fn new(config: ReconcilerConfig) -> Self {
        Self { config }
    }

    pub fn target_column(&self) -> &str {
        &self.config.target_column
    }

    /// Apply `series` to `rows`. Returns new rows in input order; `rows` is
    /// not touched. Only the target column of SISTEMA rows can change, and
    /// row identity never does.
    pub fn reconcile(&self, rows: &[NormalizedRow], series: &OverrideSeries) -> ReconcileOutcome {
        let target = self.config.target_column.as_str();
        let mut report = ReconcileReport::default();
        let mut matched: BTreeSet<(SubmarketCode, i32, u32)> = BTreeSet::new();
        let mut out = Vec::with_capacity(rows.len());

        for row in rows {
            let mut row = row.clone();
            let hit = match (row.entity, row.submarket) {
                (Entity::Sistema, Some(sm)) => {
                    series.get(sm, row.year, row.month).map(|v| (sm, v))
                }
                (Entity::Sistema, None) => None,
                _ => {
                    report.passed_through += 1;
                    out.push(row);
                    continue;
                }
            };

            match hit {
                Some((sm, value)) => {
                    report.changes.push(OverrideChange {
                        submarket: sm,
                        year: row.year,
                        month: row.month,
                        previous: row.metric(target),
                        applied: value,
                    });
                    row.set_metric(target, value);
                    matched.insert((sm, row.year, row.month));
                    report.overridden += 1;
                }
                None => report.retained += 1,
            }
            out.push(row);
        }

        report
            .changes
            .sort_by(|a, b| (a.submarket, a.year, a.month).cmp(&(b.submarket, b.year, b.month)));
        report.unused = series.cells().filter(|c| !matched.contains(*c)).copied().collect();

        info!(
            target,
            overridden = report.overridden,
            retained = report.retained,
            changed = report.changed_values(),
            unused = report.unused.len(),
            "reconcile applied"
        );

        ReconcileOutcome { rows: out, report }
    }
}

/// Reconcile the wind-generation column with the default config.
pub fn reconcile(rows: &[NormalizedRow], series: &OverrideSeries) -> Vec<NormalizedRow> {
    ForecastReconciler::default().reconcile(rows, series).rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dk_schemas::{ReconciliationOverride, Version};

    fn row(sm: SubmarketCode, m: u32, eol: f64) -> NormalizedRow {
        NormalizedRow::new(
            Entity::Sistema,
            Some(sm),
            2025,
            m,
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            Version::Preliminar,
        )
        .with_metric(columns::ENERGIA_TOTAL, 50_000.0)
        .with_metric(columns::GERACAO_EOL, eol)
    }

    fn series(cells: &[(SubmarketCode, u32, f64)]) -> OverrideSeries {
        let o: Vec<_> = cells
            .iter()
            .map(|&(submarket, month, weighted_value)| ReconciliationOverride {
                submarket,
                year: 2025,
                month,
                weighted_value,
            })
            .collect();
        OverrideSeries::from_overrides(&o)
    }

    #[test]
    fn only_target_column_changes() {
        let rows = vec![row(SubmarketCode::Ne, 6, 9_000.0)];
        let out = ForecastReconciler::default().reconcile(&rows, &series(&[(SubmarketCode::Ne, 6, 9_500.0)]));
        let r = &out.rows[0];
        assert_eq!(r.metric(columns::GERACAO_EOL), Some(9_500.0));
        assert_eq!(r.metric(columns::ENERGIA_TOTAL), Some(50_000.0));
        assert_eq!(r.key(), rows[0].key());
        assert_eq!(out.report.overridden, 1);
        assert_eq!(out.report.changes[0].previous, Some(9_000.0));
        // Caller's rows untouched.
        assert_eq!(rows[0].metric(columns::GERACAO_EOL), Some(9_000.0));
    }

    #[test]
    fn unmatched_overrides_do_not_add_rows() {
        let rows = vec![row(SubmarketCode::S, 1, 10.0)];
        let out = reconcile(&rows, &series(&[(SubmarketCode::Se, 1, 1.0), (SubmarketCode::S, 2, 2.0)]));
        assert_eq!(out, rows);
        let report = ForecastReconciler::default()
            .reconcile(&rows, &series(&[(SubmarketCode::Se, 1, 1.0)]))
            .report;
        assert_eq!(report.unused, vec![(SubmarketCode::Se, 2025, 1)]);
        assert_eq!(report.retained, 1);
    }

    #[test]
    fn non_sistema_rows_pass_through() {
        let cadic = NormalizedRow::new(
            Entity::Cadic,
            None,
            2025,
            6,
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            Version::Preliminar,
        );
        let out = ForecastReconciler::default()
            .reconcile(&[cadic.clone()], &series(&[(SubmarketCode::Se, 6, 1.0)]));
        assert_eq!(out.rows, vec![cadic]);
        assert_eq!(out.report.passed_through, 1);
    }

    #[test]
    fn configurable_target_column() {
        let rec = ForecastReconciler::new(ReconcilerConfig {
            target_column: columns::GERACAO_UFV.to_string(),
        });
        let out = rec.reconcile(&[row(SubmarketCode::N, 3, 5.0)], &series(&[(SubmarketCode::N, 3, 7.0)]));
        assert_eq!(out.rows[0].metric(columns::GERACAO_UFV), Some(7.0));
        assert_eq!(out.rows[0].metric(columns::GERACAO_EOL), Some(5.0));
        assert_eq!(out.report.changes[0].previous, None);
    }
}
