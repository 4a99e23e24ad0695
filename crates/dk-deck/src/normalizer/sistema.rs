use std::collections::BTreeMap;

use dk_schemas::{columns, Entity, GenerationCategory, NormalizedRow, SubmarketCode};
use tracing::debug;

use super::{ensure_unique, submarket, year_month, SISTEMA};
use crate::error::NormalizeError;
use crate::tables::{
    MarketEnergyRecord, UnsimulatedGenerationRecord, MARKET_ENERGY, UNSIMULATED_GENERATION,
};
use crate::version::SnapshotTag;

type CellKey = (SubmarketCode, i32, u32);

/// SISTEMA rows: market energy left-joined to the wide unsimulated
/// generation on (submarket, year, month).
///
/// A (submarket, month) whose eight generation categories are all zero or
/// absent carries no unsimulated fleet and is dropped, not emitted as zeros.
/// Surviving rows get 0 for any category the deck did not list. FC rows are
/// skipped; FC has no load or generation.
pub fn normalize_sistema(
    market: &[MarketEnergyRecord],
    unsimulated: &[UnsimulatedGenerationRecord],
    tag: SnapshotTag,
) -> Result<Vec<NormalizedRow>, NormalizeError> {
    if market.is_empty() {
        return Err(NormalizeError::EmptyExtract {
            section: SISTEMA,
            table: MARKET_ENERGY,
        });
    }
    if unsimulated.is_empty() {
        return Err(NormalizeError::EmptyExtract {
            section: SISTEMA,
            table: UNSIMULATED_GENERATION,
        });
    }

    let wide = pivot_unsimulated(unsimulated)?;

    let mut rows = Vec::with_capacity(market.len());
    let mut dropped_empty = 0usize;
    let mut skipped_fc = 0usize;

    for rec in market {
        let sm = submarket(SISTEMA, rec.submarket)?;
        if !sm.is_load_bearing() {
            skipped_fc += 1;
            continue;
        }
        let (year, month) = year_month(rec.date);

        let generation = match wide.get(&(sm, year, month)) {
            Some(g) if g.values().any(|v| *v != 0.0) => g,
            _ => {
                dropped_empty += 1;
                continue;
            }
        };

        let mut row = NormalizedRow::new(
            Entity::Sistema,
            Some(sm),
            year,
            month,
            tag.deck_date,
            tag.version,
        )
        .with_metric(columns::ENERGIA_TOTAL, rec.value);
        for cat in GenerationCategory::ALL {
            row.set_metric(cat.column(), generation.get(&cat).copied().unwrap_or(0.0));
        }
        rows.push(row);
    }

    if dropped_empty > 0 {
        debug!(dropped_empty, "sistema: rows without unsimulated generation dropped");
    }
    if skipped_fc > 0 {
        debug!(skipped_fc, "sistema: FC market rows skipped");
    }

    rows.sort_by(|a, b| (a.submarket, a.year, a.month).cmp(&(b.submarket, b.year, b.month)));
    ensure_unique(SISTEMA, &rows)?;
    Ok(rows)
}

/// Long (one row per source block) to wide (one value per category).
/// Repeated (submarket, month, category) entries are summed.
fn pivot_unsimulated(
    unsimulated: &[UnsimulatedGenerationRecord],
) -> Result<BTreeMap<CellKey, BTreeMap<GenerationCategory, f64>>, NormalizeError> {
    let mut wide: BTreeMap<CellKey, BTreeMap<GenerationCategory, f64>> = BTreeMap::new();
    for rec in unsimulated {
        let sm = submarket(SISTEMA, rec.submarket)?;
        let cat = GenerationCategory::from_block_index(rec.block_index).ok_or(
            NormalizeError::UnknownBlock {
                section: SISTEMA,
                table: UNSIMULATED_GENERATION,
                index: rec.block_index,
            },
        )?;
        let (year, month) = year_month(rec.date);
        *wide
            .entry((sm, year, month))
            .or_default()
            .entry(cat)
            .or_insert(0.0) += rec.value;
    }
    Ok(wide)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dk_schemas::Version;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn tag() -> SnapshotTag {
        SnapshotTag::new(d(2025, 2), Version::Preliminar)
    }

    fn market(sm: i64, y: i32, m: u32, v: f64) -> MarketEnergyRecord {
        MarketEnergyRecord {
            submarket: sm,
            date: d(y, m),
            value: v,
        }
    }

    fn unsim(sm: i64, idx: i64, y: i32, m: u32, v: f64) -> UnsimulatedGenerationRecord {
        UnsimulatedGenerationRecord {
            submarket: sm,
            block_index: idx,
            date: d(y, m),
            value: v,
        }
    }

    #[test]
    fn pivots_categories_into_columns() {
        let rows = normalize_sistema(
            &[market(1, 2025, 3, 40_000.0)],
            &[unsim(1, 3, 2025, 3, 800.0), unsim(1, 8, 2025, 3, 50.0)],
            tag(),
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.metric(columns::ENERGIA_TOTAL), Some(40_000.0));
        assert_eq!(r.metric(columns::GERACAO_EOL), Some(800.0));
        assert_eq!(r.metric(columns::GERACAO_UFV_MMGD), Some(50.0));
        assert_eq!(r.metric(columns::GERACAO_PCH), Some(0.0));
        assert_eq!(r.version, Version::Preliminar);
    }

    #[test]
    fn repeated_category_entries_are_summed() {
        let rows = normalize_sistema(
            &[market(2, 2025, 3, 1.0)],
            &[unsim(2, 1, 2025, 3, 10.0), unsim(2, 1, 2025, 3, 5.0)],
            tag(),
        )
        .unwrap();
        assert_eq!(rows[0].metric(columns::GERACAO_PCH), Some(15.0));
    }

    #[test]
    fn market_rows_without_generation_are_dropped() {
        let rows = normalize_sistema(
            &[market(1, 2025, 3, 1.0), market(1, 2025, 4, 1.0)],
            &[unsim(1, 2, 2025, 4, 3.0)],
            tag(),
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].month, 4);
    }

    #[test]
    fn fc_market_rows_are_skipped() {
        let rows = normalize_sistema(
            &[market(11, 2025, 3, 1.0), market(4, 2025, 3, 1.0)],
            &[unsim(4, 4, 2025, 3, 3.0)],
            tag(),
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].submarket, Some(SubmarketCode::N));
    }

    #[test]
    fn unknown_codes_fail_with_section() {
        let err = normalize_sistema(&[market(1, 2025, 3, 1.0)], &[unsim(1, 9, 2025, 3, 1.0)], tag())
            .unwrap_err();
        assert!(matches!(err, NormalizeError::UnknownBlock { index: 9, .. }));

        let err = normalize_sistema(&[market(7, 2025, 3, 1.0)], &[unsim(1, 1, 2025, 3, 1.0)], tag())
            .unwrap_err();
        assert_eq!(err.section(), Some(SISTEMA));
    }

    #[test]
    fn empty_tables_are_rejected() {
        assert!(matches!(
            normalize_sistema(&[], &[unsim(1, 1, 2025, 3, 1.0)], tag()),
            Err(NormalizeError::EmptyExtract { table: MARKET_ENERGY, .. })
        ));
        assert!(matches!(
            normalize_sistema(&[market(1, 2025, 3, 1.0)], &[], tag()),
            Err(NormalizeError::EmptyExtract { table: UNSIMULATED_GENERATION, .. })
        ));
    }
}
