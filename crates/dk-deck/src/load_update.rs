//! Monthly load-forecast revisions applied to SISTEMA and CADIC.
//!
//! The monthly load product republishes net load and distributed-generation
//! (MMGD) expectations between decks. A regular revision produces partial
//! SISTEMA / CADIC update rows. A quadrimestral revision is merged onto the
//! last definitive deck and re-tagged.
//!
//! Rounding follows the downstream store: net load is truncated to an
//! integer, MMGD generation keeps two decimals, and CADIC MMGD loads are
//! whole numbers. Halves round to even.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use dk_schemas::{columns, Entity, NormalizedRow, SubmarketCode, Version};
use tracing::{debug, info};

use crate::error::NormalizeError;
use crate::normalizer::ensure_unique;
use crate::tables::MonthlyLoadForecastRecord;

const SECTION: &str = "CARGA_MENSAL";

/// Only this load block feeds the monthly update.
pub const MEDIUM: &str = "MEDIUM";

/// SISTEMA columns a monthly revision replaces.
pub const SISTEMA_UPDATE_COLUMNS: [&str; 5] = [
    columns::ENERGIA_TOTAL,
    columns::GERACAO_PCH_MMGD,
    columns::GERACAO_PCT_MMGD,
    columns::GERACAO_EOL_MMGD,
    columns::GERACAO_UFV_MMGD,
];

/// SISTEMA columns kept from the last deck in a quadrimestral merge.
pub const SISTEMA_KEPT_COLUMNS: [&str; 4] = [
    columns::GERACAO_PCH,
    columns::GERACAO_EOL,
    columns::GERACAO_UFV,
    columns::GERACAO_PCT,
];

/// CADIC columns kept from the last deck in a quadrimestral merge.
pub const CADIC_KEPT_COLUMNS: [&str; 3] = [columns::CONST_ITAIPU, columns::ANDE, columns::BOA_VISTA];

/// CADIC columns a monthly revision replaces.
pub const CADIC_UPDATE_COLUMNS: [&str; 4] = [
    columns::MMGD_SE,
    columns::MMGD_S,
    columns::MMGD_NE,
    columns::MMGD_N,
];

#[derive(Debug, Clone, PartialEq)]
pub struct LoadUpdate {
    pub deck_date: NaiveDate,
    pub version: Version,
    pub sistema: Vec<NormalizedRow>,
    pub cadic: Vec<NormalizedRow>,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}

fn cadic_mmgd_column(sm: SubmarketCode) -> Option<&'static str> {
    match sm {
        SubmarketCode::Se => Some(columns::MMGD_SE),
        SubmarketCode::S => Some(columns::MMGD_S),
        SubmarketCode::Ne => Some(columns::MMGD_NE),
        SubmarketCode::N => Some(columns::MMGD_N),
        SubmarketCode::Fc => None,
    }
}

// ---------------------------------------------------------------------------
// Update preparation
// ---------------------------------------------------------------------------

/// Turn monthly load-forecast records into SISTEMA and CADIC update rows.
pub fn prepare_load_update(
    records: &[MonthlyLoadForecastRecord],
    deck_date: NaiveDate,
    version: Version,
) -> Result<LoadUpdate, NormalizeError> {
    let medium: Vec<&MonthlyLoadForecastRecord> = records
        .iter()
        .filter(|r| r.load_type.trim().eq_ignore_ascii_case(MEDIUM))
        .collect();
    if medium.is_empty() {
        return Err(NormalizeError::EmptyExtract {
            section: SECTION,
            table: "medium load block",
        });
    }
    debug!(kept = medium.len(), total = records.len(), "load update: MEDIUM rows kept");

    let mut sistema = Vec::with_capacity(medium.len());
    let mut cadic: BTreeMap<(i32, u32), BTreeMap<&'static str, f64>> = BTreeMap::new();

    for rec in medium {
        let sm = SubmarketCode::from_region_name(&rec.source).map_err(|source| {
            NormalizeError::Registry {
                section: SECTION,
                source,
            }
        })?;
        let (year, month) = (rec.date.year(), rec.date.month());

        let mut row = NormalizedRow::new(Entity::Sistema, Some(sm), year, month, deck_date, version)
            .with_metric(columns::ENERGIA_TOTAL, rec.load_net_mmgd.trunc());
        for (col, v) in [
            (columns::GERACAO_PCH_MMGD, rec.exp_cgh),
            (columns::GERACAO_EOL_MMGD, rec.exp_eol),
            (columns::GERACAO_UFV_MMGD, rec.exp_ufv),
            (columns::GERACAO_PCT_MMGD, rec.exp_ute),
        ] {
            if let Some(v) = v {
                row.set_metric(col, round2(v));
            }
        }
        sistema.push(row);

        let cell = cadic.entry((year, month)).or_default();
        if let (Some(col), Some(v)) = (cadic_mmgd_column(sm), rec.base_mmgd) {
            // First value wins.
            cell.entry(col).or_insert(v);
        }
    }

    let cadic: Vec<NormalizedRow> = cadic
        .into_iter()
        .map(|((year, month), values)| {
            let mut row = NormalizedRow::new(Entity::Cadic, None, year, month, deck_date, version);
            for col in CADIC_UPDATE_COLUMNS {
                let v = values.get(col).copied().unwrap_or(0.0);
                row.set_metric(col, v.round_ties_even());
            }
            row
        })
        .collect();

    sistema.sort_by(|a, b| (a.submarket, a.year, a.month).cmp(&(b.submarket, b.year, b.month)));
    ensure_unique(SECTION, &sistema)?;

    Ok(LoadUpdate {
        deck_date,
        version,
        sistema,
        cadic,
    })
}

// ---------------------------------------------------------------------------
// Quadrimestral merge
// ---------------------------------------------------------------------------

/// Merge a quadrimestral revision onto the last definitive deck.
///
/// Left join from the last deck: every last-deck row survives, keeping its
/// own non-MMGD columns and taking the update's columns where the update has
/// a matching (year, month[, submarket]). `vl_boa_vista` is zeroed. All rows
/// are re-tagged `QUADRIMESTRAL` with the update's deck date.
pub fn merge_quadrimestral(
    last_sistema: &[NormalizedRow],
    last_cadic: &[NormalizedRow],
    update: &LoadUpdate,
) -> Result<LoadUpdate, NormalizeError> {
    let sistema_updates: BTreeMap<(Option<SubmarketCode>, i32, u32), &NormalizedRow> = update
        .sistema
        .iter()
        .map(|r| ((r.submarket, r.year, r.month), r))
        .collect();
    let cadic_updates: BTreeMap<(i32, u32), &NormalizedRow> = update
        .cadic
        .iter()
        .map(|r| ((r.year, r.month), r))
        .collect();

    let retag = |src: &NormalizedRow, entity: Entity, submarket: Option<SubmarketCode>| {
        NormalizedRow::new(
            entity,
            submarket,
            src.year,
            src.month,
            update.deck_date,
            Version::Quadrimestral,
        )
    };

    let mut matched = 0usize;

    let mut sistema = Vec::with_capacity(last_sistema.len());
    for last in last_sistema.iter().filter(|r| r.entity == Entity::Sistema) {
        let mut row = retag(last, Entity::Sistema, last.submarket);
        copy_columns(last, &mut row, &SISTEMA_KEPT_COLUMNS);
        if let Some(u) = sistema_updates.get(&(last.submarket, last.year, last.month)) {
            copy_columns(u, &mut row, &SISTEMA_UPDATE_COLUMNS);
            matched += 1;
        }
        sistema.push(row);
    }

    let mut cadic = Vec::with_capacity(last_cadic.len());
    for last in last_cadic.iter().filter(|r| r.entity == Entity::Cadic) {
        let mut row = retag(last, Entity::Cadic, None);
        copy_columns(last, &mut row, &CADIC_KEPT_COLUMNS);
        row.set_metric(columns::BOA_VISTA, 0.0);
        if let Some(u) = cadic_updates.get(&(last.year, last.month)) {
            copy_columns(u, &mut row, &CADIC_UPDATE_COLUMNS);
            matched += 1;
        }
        cadic.push(row);
    }

    info!(
        sistema = sistema.len(),
        cadic = cadic.len(),
        matched,
        deck_date = %update.deck_date,
        "quadrimestral merge"
    );

    ensure_unique(SECTION, &sistema)?;
    ensure_unique(SECTION, &cadic)?;

    Ok(LoadUpdate {
        deck_date: update.deck_date,
        version: Version::Quadrimestral,
        sistema,
        cadic,
    })
}

fn copy_columns(from: &NormalizedRow, to: &mut NormalizedRow, cols: &[&str]) {
    for col in cols {
        if let Some(v) = from.metric(col) {
            to.set_metric(col, v);
        }
    }
}
