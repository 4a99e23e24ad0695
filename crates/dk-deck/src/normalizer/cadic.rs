use std::collections::BTreeMap;

use dk_schemas::{CadicCategory, Entity, NormalizedRow};
use tracing::debug;

use super::{ensure_unique, CADIC};
use crate::error::NormalizeError;
use crate::tables::{CadicLoadRecord, CADIC_LOADS};
use crate::version::SnapshotTag;

/// First year the deck uses as "not applicable".
pub const SENTINEL_YEAR: i32 = 9999;

/// CADIC rows: one per (year, month), one column per additional-load
/// category.
///
/// Sentinel-dated entries are dropped before the category lookup. Labels go
/// through the closed [`CadicCategory`] table; an unknown label fails the
/// snapshot. Repeated (month, category) entries are summed; blank cells stay
/// absent.
pub fn normalize_cadic(
    loads: &[CadicLoadRecord],
    tag: SnapshotTag,
) -> Result<Vec<NormalizedRow>, NormalizeError> {
    if loads.is_empty() {
        return Err(NormalizeError::EmptyExtract {
            section: CADIC,
            table: CADIC_LOADS,
        });
    }

    let mut wide: BTreeMap<(i32, u32), BTreeMap<CadicCategory, f64>> = BTreeMap::new();
    let mut sentinel = 0usize;

    for rec in loads {
        if rec.year >= SENTINEL_YEAR {
            sentinel += 1;
            continue;
        }
        let cat = CadicCategory::from_label(&rec.category).ok_or_else(|| {
            NormalizeError::UnknownCategory {
                section: CADIC,
                label: rec.category.clone(),
            }
        })?;
        let cell = wide.entry((rec.year, rec.month)).or_default();
        if let Some(v) = rec.value {
            *cell.entry(cat).or_insert(0.0) += v;
        }
    }

    if sentinel > 0 {
        debug!(sentinel, "cadic: sentinel-dated entries filtered");
    }
    if wide.is_empty() {
        return Err(NormalizeError::EmptyExtract {
            section: CADIC,
            table: CADIC_LOADS,
        });
    }

    let rows: Vec<NormalizedRow> = wide
        .into_iter()
        .map(|((year, month), values)| {
            let mut row =
                NormalizedRow::new(Entity::Cadic, None, year, month, tag.deck_date, tag.version);
            for (cat, v) in values {
                row.set_metric(cat.column(), v);
            }
            row
        })
        .collect();

    ensure_unique(CADIC, &rows)?;
    Ok(rows)
}
