//! Raw deck tables, as handed over by the deck-format decoder.
//!
//! These are the explicit contract between the external tokenizer and the
//! normalizers: fixed table names, fixed column names, fixed types. Submarket
//! and block values stay as the raw integer codes the deck uses; mapping them
//! onto closed enums is the normalizer's job, so an out-of-range code surfaces
//! as a [`crate::NormalizeError`] with section context.
//!
//! It does **not**:
//! - tokenize deck files (see [`crate::DeckDecoder`])
//! - validate codes or categories

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Table names
// ---------------------------------------------------------------------------

pub const MARKET_ENERGY: &str = "market_energy";
pub const UNSIMULATED_GENERATION: &str = "unsimulated_generation";
pub const CADIC_LOADS: &str = "cadic_loads";
pub const BLOCK_LOAD: &str = "block_load";
pub const BLOCK_DURATION: &str = "block_duration";
pub const BLOCK_EXCHANGE: &str = "block_exchange";
pub const BLOCK_UNSIMULATED: &str = "block_unsimulated";

// ---------------------------------------------------------------------------
// SISTEMA
// ---------------------------------------------------------------------------

/// Monthly market energy (total load) per submarket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEnergyRecord {
    pub submarket: i64,
    pub date: NaiveDate,
    pub value: f64,
}

/// Monthly unsimulated generation, long format: one row per source block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsimulatedGenerationRecord {
    pub submarket: i64,
    /// Source category index (1 = PCH .. 8 = UFV MMGD).
    pub block_index: i64,
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SistemaTables {
    pub market_energy: Vec<MarketEnergyRecord>,
    pub unsimulated_generation: Vec<UnsimulatedGenerationRecord>,
}

// ---------------------------------------------------------------------------
// CADIC
// ---------------------------------------------------------------------------

/// One additional-load entry. `year >= 9999` marks "not applicable".
///
/// Kept as (year, month) rather than a date: the sentinel year does not
/// always fit a calendar type on the producer side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadicLoadRecord {
    pub year: i32,
    pub month: u32,
    pub category: String,
    /// `None` when the deck leaves the cell blank.
    #[serde(default)]
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CadicTables {
    pub cadic_loads: Vec<CadicLoadRecord>,
}

// ---------------------------------------------------------------------------
// PATAMAR
// ---------------------------------------------------------------------------

/// Per-unit load by block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockLoadRecord {
    pub submarket: i64,
    pub date: NaiveDate,
    pub block: i64,
    pub value: f64,
}

/// Block duration, as a fraction of the month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDurationRecord {
    pub date: NaiveDate,
    pub block: i64,
    pub value: f64,
}

/// Per-unit exchange limit by block between two submarkets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockExchangeRecord {
    pub from_submarket: i64,
    pub to_submarket: i64,
    pub date: NaiveDate,
    pub block: i64,
    pub value: f64,
}

/// Per-unit unsimulated generation by block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockUnsimulatedRecord {
    pub submarket: i64,
    /// Source category index, same numbering as [`UnsimulatedGenerationRecord`].
    pub block_index: i64,
    pub date: NaiveDate,
    pub block: i64,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatamarTables {
    pub block_load: Vec<BlockLoadRecord>,
    pub block_duration: Vec<BlockDurationRecord>,
    pub block_exchange: Vec<BlockExchangeRecord>,
    /// Optional in the deck; an empty table is valid.
    pub block_unsimulated: Vec<BlockUnsimulatedRecord>,
}

// ---------------------------------------------------------------------------
// Monthly load forecast (CargaMensal spreadsheet export)
// ---------------------------------------------------------------------------

/// One row of the monthly load forecast product, with the product's own
/// column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyLoadForecastRecord {
    #[serde(rename = "DATE")]
    pub date: NaiveDate,
    /// Region name (`SUDESTE`, `SUL`, `NORDESTE`, `NORTE`).
    #[serde(rename = "SOURCE")]
    pub source: String,
    /// Load block: `MEDIUM`, `HIGH`, `MIDDLE`, `LOW`.
    #[serde(rename = "TYPE")]
    pub load_type: String,
    /// Load net of distributed generation.
    #[serde(rename = "LOAD_sMMGD")]
    pub load_net_mmgd: f64,
    #[serde(rename = "Exp_CGH", default)]
    pub exp_cgh: Option<f64>,
    #[serde(rename = "Exp_EOL", default)]
    pub exp_eol: Option<f64>,
    #[serde(rename = "Exp_UFV", default)]
    pub exp_ufv: Option<f64>,
    #[serde(rename = "Exp_UTE", default)]
    pub exp_ute: Option<f64>,
    #[serde(rename = "Base_MMGD", default)]
    pub base_mmgd: Option<f64>,
}
