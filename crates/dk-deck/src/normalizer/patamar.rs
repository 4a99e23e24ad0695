use std::collections::BTreeMap;

use dk_schemas::{columns, Block, Entity, GenerationCategory, NormalizedRow, RowCategory};
use tracing::debug;

use super::{block, ensure_unique, submarket, year_month, PATAMAR};
use crate::error::NormalizeError;
use crate::tables::{
    BlockDurationRecord, BlockExchangeRecord, BlockLoadRecord, BlockUnsimulatedRecord,
    PatamarTables, BLOCK_DURATION, BLOCK_EXCHANGE, BLOCK_LOAD, BLOCK_UNSIMULATED,
};
use crate::version::SnapshotTag;

/// The two PATAMAR products.
#[derive(Debug, Clone, PartialEq)]
pub struct PatamarRows {
    /// Load (`CARGA`) and unsimulated generation stacked by category.
    pub load: Vec<NormalizedRow>,
    /// Inter-submarket exchange by block.
    pub exchange: Vec<NormalizedRow>,
}

type DurationKey = (i32, u32, Block);

/// PATAMAR rows, both products sharing one block-duration table.
///
/// Load rows keep an unmatched duration as absent (left join). Exchange rows
/// without a duration for their (month, block) are dropped (inner join).
/// Both joins key on (year, month, block): durations vary by month, and one
/// exchange row must get exactly one duration.
pub fn normalize_patamar(
    tables: &PatamarTables,
    tag: SnapshotTag,
) -> Result<PatamarRows, NormalizeError> {
    for (name, empty) in [
        (BLOCK_LOAD, tables.block_load.is_empty()),
        (BLOCK_DURATION, tables.block_duration.is_empty()),
        (BLOCK_EXCHANGE, tables.block_exchange.is_empty()),
    ] {
        if empty {
            return Err(NormalizeError::EmptyExtract {
                section: PATAMAR,
                table: name,
            });
        }
    }

    let durations = index_durations(&tables.block_duration)?;

    let mut load = Vec::with_capacity(tables.block_load.len() + tables.block_unsimulated.len());
    for rec in &tables.block_load {
        load.push(load_row(rec, &durations, tag)?);
    }
    for rec in &tables.block_unsimulated {
        load.push(unsimulated_row(rec, &durations, tag)?);
    }

    let mut exchange = Vec::with_capacity(tables.block_exchange.len());
    let mut unmatched = 0usize;
    for rec in &tables.block_exchange {
        match exchange_row(rec, &durations, tag)? {
            Some(row) => exchange.push(row),
            None => unmatched += 1,
        }
    }
    if unmatched > 0 {
        debug!(unmatched, "patamar: exchange rows without block duration dropped");
    }

    load.sort_by(|a, b| a.key().cmp(&b.key()));
    exchange.sort_by(|a, b| a.key().cmp(&b.key()));
    ensure_unique(PATAMAR, &load)?;
    ensure_unique(PATAMAR, &exchange)?;

    Ok(PatamarRows { load, exchange })
}

fn index_durations(
    records: &[BlockDurationRecord],
) -> Result<BTreeMap<DurationKey, f64>, NormalizeError> {
    let mut out = BTreeMap::new();
    for rec in records {
        let (year, month) = year_month(rec.date);
        let b = block(PATAMAR, BLOCK_DURATION, rec.block)?;
        out.entry((year, month, b)).or_insert(rec.value);
    }
    Ok(out)
}

fn with_duration(mut row: NormalizedRow, duration: Option<f64>) -> NormalizedRow {
    if let Some(v) = duration {
        row.set_metric(columns::DURACAO_PATAMAR, v);
    }
    row
}

fn load_row(
    rec: &BlockLoadRecord,
    durations: &BTreeMap<DurationKey, f64>,
    tag: SnapshotTag,
) -> Result<NormalizedRow, NormalizeError> {
    let sm = submarket(PATAMAR, rec.submarket)?;
    let b = block(PATAMAR, BLOCK_LOAD, rec.block)?;
    let (year, month) = year_month(rec.date);
    let row = NormalizedRow::new(Entity::PatamarLoad, Some(sm), year, month, tag.deck_date, tag.version)
        .with_block(b)
        .with_category(RowCategory::Carga)
        .with_metric(columns::VALOR_PU, rec.value);
    Ok(with_duration(row, durations.get(&(year, month, b)).copied()))
}

fn unsimulated_row(
    rec: &BlockUnsimulatedRecord,
    durations: &BTreeMap<DurationKey, f64>,
    tag: SnapshotTag,
) -> Result<NormalizedRow, NormalizeError> {
    let sm = submarket(PATAMAR, rec.submarket)?;
    let b = block(PATAMAR, BLOCK_UNSIMULATED, rec.block)?;
    let cat = GenerationCategory::from_block_index(rec.block_index).ok_or(
        NormalizeError::UnknownBlock {
            section: PATAMAR,
            table: BLOCK_UNSIMULATED,
            index: rec.block_index,
        },
    )?;
    let (year, month) = year_month(rec.date);
    let row = NormalizedRow::new(Entity::PatamarLoad, Some(sm), year, month, tag.deck_date, tag.version)
        .with_block(b)
        .with_category(RowCategory::Generation(cat))
        .with_metric(columns::VALOR_PU, rec.value);
    Ok(with_duration(row, durations.get(&(year, month, b)).copied()))
}

fn exchange_row(
    rec: &BlockExchangeRecord,
    durations: &BTreeMap<DurationKey, f64>,
    tag: SnapshotTag,
) -> Result<Option<NormalizedRow>, NormalizeError> {
    let from = submarket(PATAMAR, rec.from_submarket)?;
    let to = submarket(PATAMAR, rec.to_submarket)?;
    let b = block(PATAMAR, BLOCK_EXCHANGE, rec.block)?;
    let (year, month) = year_month(rec.date);
    let Some(duration) = durations.get(&(year, month, b)).copied() else {
        return Ok(None);
    };
    Ok(Some(
        NormalizedRow::new(Entity::PatamarExchange, Some(from), year, month, tag.deck_date, tag.version)
            .with_counterpart(to)
            .with_block(b)
            .with_metric(columns::INTERCAMBIO, rec.value)
            .with_metric(columns::DURACAO_PATAMAR, duration),
    ))
}
