//! Deck snapshot normalization.
//!
//! Converts decoded deck tables ([`crate::tables`]) into canonical
//! [`NormalizedRow`]s tagged with the snapshot's deck date and version.
//! Each entity has its own submodule; this one holds the helpers they share.
//!
//! It does **not**:
//! - read files (see [`crate::DeckDecoder`])
//! - reconcile or diff snapshots
//! - publish rows anywhere
//!
//! Inputs are borrowed and never mutated; every call returns fresh rows.

mod cadic;
mod patamar;
mod sistema;

pub use cadic::normalize_cadic;
pub use patamar::{normalize_patamar, PatamarRows};
pub use sistema::normalize_sistema;

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use dk_schemas::{Block, NormalizedRow, SubmarketCode};

use crate::error::NormalizeError;

pub(crate) const SISTEMA: &str = "SISTEMA";
pub(crate) const CADIC: &str = "CADIC";
pub(crate) const PATAMAR: &str = "PATAMAR";

pub(crate) fn submarket(section: &'static str, code: i64) -> Result<SubmarketCode, NormalizeError> {
    SubmarketCode::from_code(code).map_err(|source| NormalizeError::Registry { section, source })
}

pub(crate) fn block(
    section: &'static str,
    table: &'static str,
    index: i64,
) -> Result<Block, NormalizeError> {
    Block::from_index(index).ok_or(NormalizeError::UnknownBlock {
        section,
        table,
        index,
    })
}

pub(crate) fn year_month(d: NaiveDate) -> (i32, u32) {
    (d.year(), d.month())
}

/// Fail on the first repeated row identity.
pub fn ensure_unique(section: &'static str, rows: &[NormalizedRow]) -> Result<(), NormalizeError> {
    let mut seen = HashSet::with_capacity(rows.len());
    for row in rows {
        let key = row.key();
        if !seen.insert(key.clone()) {
            return Err(NormalizeError::DuplicateRow {
                section,
                key: key.to_string(),
            });
        }
    }
    Ok(())
}
