//! Snapshot quality report for normalized rows.
//!
//! Accepts a slice of [`NormalizedRow`] and produces a [`QualityReport`]
//! covering:
//! - total row count and per-entity counts
//! - duplicate row identities
//! - month gaps inside each series
//! - earliest / latest (year, month) overall
//!
//! This module does **not**:
//! - fail anything (see [`crate::normalizer::ensure_unique`] for the hard check)
//! - normalize or fetch data

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use dk_schemas::{BlockTag, Entity, NormalizedRow, RowCategory, RowKey, SubmarketCode, Version};

// ---------------------------------------------------------------------------
// Issue types
// ---------------------------------------------------------------------------

/// One time series inside a snapshot: everything in the row identity except
/// (year, month).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SeriesKey {
    pub entity: Entity,
    pub submarket: Option<SubmarketCode>,
    pub counterpart: Option<SubmarketCode>,
    pub block: Option<BlockTag>,
    pub category: Option<RowCategory>,
    pub version: Version,
    pub deck_date: NaiveDate,
}

impl SeriesKey {
    fn of(row: &NormalizedRow) -> Self {
        Self {
            entity: row.entity,
            submarket: row.submarket,
            counterpart: row.counterpart,
            block: row.block.clone(),
            category: row.category,
            version: row.version,
            deck_date: row.deck_date,
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.entity)?;
        if let Some(s) = self.submarket {
            write!(f, ", {s}")?;
        }
        if let Some(c) = self.counterpart {
            write!(f, "->{c}")?;
        }
        if let Some(BlockTag::Patamar(b)) = &self.block {
            write!(f, ", patamar {}", b.index())?;
        }
        if let Some(BlockTag::Station(t)) = &self.block {
            write!(f, ", {t}")?;
        }
        if let Some(c) = &self.category {
            write!(f, ", {}", c.label())?;
        }
        write!(f, ", {} {})", self.version, self.deck_date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateIssue {
    pub key: RowKey,
    /// Always >= 2.
    pub count: usize,
}

/// Consecutive months in a series are more than one month apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapIssue {
    pub series: SeriesKey,
    pub prev: (i32, u32),
    pub next: (i32, u32),
    /// Whole months missing between `prev` and `next`.
    pub missing_months: i64,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct QualityReport {
    pub total_rows: usize,
    pub rows_by_entity: BTreeMap<Entity, usize>,
    pub earliest: Option<(i32, u32)>,
    pub latest: Option<(i32, u32)>,
    /// Sorted by key.
    pub duplicates: Vec<DuplicateIssue>,
    /// Sorted by (series, prev).
    pub gaps: Vec<GapIssue>,
}

impl QualityReport {
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty() && self.gaps.is_empty()
    }
}

fn ym(v: Option<(i32, u32)>) -> String {
    v.map(|(y, m)| format!("{y}-{m:02}"))
        .unwrap_or_else(|| "none".to_string())
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "QualityReport {{")?;
        writeln!(f, "  total_rows: {}", self.total_rows)?;
        for (e, n) in &self.rows_by_entity {
            writeln!(f, "  rows[{e}]: {n}")?;
        }
        writeln!(f, "  earliest: {}", ym(self.earliest))?;
        writeln!(f, "  latest: {}", ym(self.latest))?;
        writeln!(f, "  duplicates: {}", self.duplicates.len())?;
        for d in &self.duplicates {
            writeln!(f, "    key={} count={}", d.key, d.count)?;
        }
        writeln!(f, "  gaps: {}", self.gaps.len())?;
        for g in &self.gaps {
            writeln!(
                f,
                "    series={} prev={} next={} missing={}",
                g.series,
                ym(Some(g.prev)),
                ym(Some(g.next)),
                g.missing_months
            )?;
        }
        write!(f, "}}")
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

fn month_index((y, m): (i32, u32)) -> i64 {
    y as i64 * 12 + m as i64 - 1
}

/// Build a [`QualityReport`]. Order-independent; never mutates `rows`.
pub fn build_quality_report(rows: &[NormalizedRow]) -> QualityReport {
    let mut rows_by_entity: BTreeMap<Entity, usize> = BTreeMap::new();
    let mut key_counts: BTreeMap<RowKey, usize> = BTreeMap::new();
    let mut series: BTreeMap<SeriesKey, Vec<(i32, u32)>> = BTreeMap::new();

    for row in rows {
        *rows_by_entity.entry(row.entity).or_insert(0) += 1;
        *key_counts.entry(row.key()).or_insert(0) += 1;
        series
            .entry(SeriesKey::of(row))
            .or_default()
            .push((row.year, row.month));
    }

    let duplicates = key_counts
        .into_iter()
        .filter(|(_, n)| *n >= 2)
        .map(|(key, count)| DuplicateIssue { key, count })
        .collect();

    let mut gaps = Vec::new();
    for (key, months) in &mut series {
        months.sort_unstable();
        months.dedup();
        for w in months.windows(2) {
            let delta = month_index(w[1]) - month_index(w[0]);
            if delta > 1 {
                gaps.push(GapIssue {
                    series: key.clone(),
                    prev: w[0],
                    next: w[1],
                    missing_months: delta - 1,
                });
            }
        }
    }

    QualityReport {
        total_rows: rows.len(),
        rows_by_entity,
        earliest: rows.iter().map(|r| (r.year, r.month)).min(),
        latest: rows.iter().map(|r| (r.year, r.month)).max(),
        duplicates,
        gaps,
    }
}
