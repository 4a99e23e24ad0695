//! Canonical normalized row and its tags.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::category::GenerationCategory;
use crate::columns;
use crate::submarket::SubmarketCode;

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Entity {
    Sistema,
    Cadic,
    PatamarLoad,
    PatamarExchange,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Sistema => "SISTEMA",
            Entity::Cadic => "CADIC",
            Entity::PatamarLoad => "PATAMAR_LOAD",
            Entity::PatamarExchange => "PATAMAR_EXCHANGE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SISTEMA" => Some(Entity::Sistema),
            "CADIC" => Some(Entity::Cadic),
            "PATAMAR_LOAD" => Some(Entity::PatamarLoad),
            "PATAMAR_EXCHANGE" => Some(Entity::PatamarExchange),
            _ => None,
        }
    }

    /// The full metric column set the persistence API expects for this entity.
    pub fn metric_columns(&self) -> &'static [&'static str] {
        match self {
            Entity::Sistema => &[
                columns::ENERGIA_TOTAL,
                columns::GERACAO_PCH,
                columns::GERACAO_PCT,
                columns::GERACAO_EOL,
                columns::GERACAO_UFV,
                columns::GERACAO_PCH_MMGD,
                columns::GERACAO_PCT_MMGD,
                columns::GERACAO_EOL_MMGD,
                columns::GERACAO_UFV_MMGD,
            ],
            Entity::Cadic => &[
                columns::CONST_ITAIPU,
                columns::ANDE,
                columns::MMGD_SE,
                columns::MMGD_S,
                columns::MMGD_NE,
                columns::MMGD_N,
                columns::BOA_VISTA,
            ],
            Entity::PatamarLoad => &[columns::VALOR_PU, columns::DURACAO_PATAMAR],
            Entity::PatamarExchange => &[columns::INTERCAMBIO, columns::DURACAO_PATAMAR],
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publication stage of a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Version {
    Preliminar,
    Definitivo,
    Quadrimestral,
}

impl Version {
    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Preliminar => "preliminar",
            Version::Definitivo => "definitivo",
            Version::Quadrimestral => "quadrimestral",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Load block ("patamar").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Block {
    Pesado,
    Medio,
    Leve,
}

impl Block {
    /// Deck block index (1 = heavy, 2 = medium, 3 = light).
    pub fn from_index(idx: i64) -> Option<Self> {
        match idx {
            1 => Some(Block::Pesado),
            2 => Some(Block::Medio),
            3 => Some(Block::Leve),
            _ => None,
        }
    }

    pub fn index(&self) -> i64 {
        match self {
            Block::Pesado => 1,
            Block::Medio => 2,
            Block::Leve => 3,
        }
    }
}

/// Row block tag: either a load block or a free station tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockTag {
    Patamar(Block),
    Station(String),
}

/// Category of a long-format row: the load itself or one generation source.
/// A row is one or the other, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RowCategory {
    Carga,
    Generation(GenerationCategory),
}

impl RowCategory {
    pub fn label(&self) -> &'static str {
        match self {
            RowCategory::Carga => "CARGA",
            RowCategory::Generation(g) => g.label(),
        }
    }
}

impl TryFrom<String> for RowCategory {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.trim().eq_ignore_ascii_case("CARGA") {
            return Ok(RowCategory::Carga);
        }
        GenerationCategory::from_label(&s)
            .map(RowCategory::Generation)
            .ok_or_else(|| format!("unknown row category '{s}'"))
    }
}

impl From<RowCategory> for String {
    fn from(c: RowCategory) -> String {
        c.label().to_string()
    }
}

// ---------------------------------------------------------------------------
// Normalized row
// ---------------------------------------------------------------------------

/// One canonical row of a normalized deck snapshot.
///
/// `submarket` is `None` only for CADIC rows, which are pivoted to one row per
/// (year, month) with per-submarket columns. `counterpart` is set only on
/// exchange rows (the receiving submarket).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    pub entity: Entity,
    pub submarket: Option<SubmarketCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterpart: Option<SubmarketCode>,
    pub year: i32,
    pub month: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<BlockTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<RowCategory>,
    /// Absent key = no value (a left-join miss), which is different from 0.
    pub metrics: BTreeMap<String, f64>,
    pub deck_date: NaiveDate,
    pub version: Version,
}

/// Identity of a row inside one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowKey {
    pub entity: Entity,
    pub submarket: Option<SubmarketCode>,
    pub counterpart: Option<SubmarketCode>,
    pub year: i32,
    pub month: u32,
    pub block: Option<BlockTag>,
    pub category: Option<RowCategory>,
    pub version: Version,
    pub deck_date: NaiveDate,
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, ", self.entity)?;
        match self.submarket {
            Some(s) => write!(f, "{s}")?,
            None => f.write_str("-")?,
        }
        if let Some(c) = self.counterpart {
            write!(f, "->{c}")?;
        }
        write!(f, ", {}-{:02}", self.year, self.month)?;
        if let Some(b) = &self.block {
            write!(f, ", {b:?}")?;
        }
        if let Some(c) = &self.category {
            write!(f, ", {}", c.label())?;
        }
        write!(f, ", {}, {})", self.version, self.deck_date)
    }
}

impl NormalizedRow {
    pub fn new(
        entity: Entity,
        submarket: Option<SubmarketCode>,
        year: i32,
        month: u32,
        deck_date: NaiveDate,
        version: Version,
    ) -> Self {
        Self {
            entity,
            submarket,
            counterpart: None,
            year,
            month,
            block: None,
            category: None,
            metrics: BTreeMap::new(),
            deck_date,
            version,
        }
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.block = Some(BlockTag::Patamar(block));
        self
    }

    pub fn with_category(mut self, category: RowCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_counterpart(mut self, counterpart: SubmarketCode) -> Self {
        self.counterpart = Some(counterpart);
        self
    }

    pub fn with_metric(mut self, column: &str, value: f64) -> Self {
        self.metrics.insert(column.to_string(), value);
        self
    }

    pub fn metric(&self, column: &str) -> Option<f64> {
        self.metrics.get(column).copied()
    }

    pub fn set_metric(&mut self, column: &str, value: f64) {
        self.metrics.insert(column.to_string(), value);
    }

    pub fn key(&self) -> RowKey {
        RowKey {
            entity: self.entity,
            submarket: self.submarket,
            counterpart: self.counterpart,
            year: self.year,
            month: self.month,
            block: self.block.clone(),
            category: self.category,
            version: self.version,
            deck_date: self.deck_date,
        }
    }

    /// Flat JSON record in the persistence API's shape.
    ///
    /// Every column of [`Entity::metric_columns`] is present; absent metrics
    /// are emitted as `null`. Extra metrics on the row are appended.
    pub fn to_record(&self) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert(columns::ANO.to_string(), Value::from(self.year));
        m.insert(columns::MES.to_string(), Value::from(self.month));
        if let Some(s) = self.submarket {
            m.insert(columns::SUBMERCADO.to_string(), Value::from(s.code()));
        }
        if let Some(c) = self.counterpart {
            m.insert(columns::SUBMERCADO_PARA.to_string(), Value::from(c.code()));
        }
        match &self.block {
            Some(BlockTag::Patamar(b)) => {
                m.insert(columns::PATAMAR.to_string(), Value::from(b.index()));
            }
            Some(BlockTag::Station(tag)) => {
                m.insert(columns::PATAMAR.to_string(), Value::from(tag.clone()));
            }
            None => {}
        }
        if let Some(c) = &self.category {
            m.insert(columns::CATEGORIA.to_string(), Value::from(c.label()));
        }
        for col in self.entity.metric_columns() {
            m.insert(col.to_string(), number_or_null(self.metric(col)));
        }
        for (col, v) in &self.metrics {
            if !m.contains_key(col) {
                m.insert(col.clone(), number_or_null(Some(*v)));
            }
        }
        m.insert(columns::VERSAO.to_string(), Value::from(self.version.as_str()));
        m.insert(
            columns::DT_DECK.to_string(),
            Value::from(self.deck_date.format("%Y-%m-%d").to_string()),
        );
        m
    }
}

fn number_or_null(v: Option<f64>) -> Value {
    v.and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

// ---------------------------------------------------------------------------
// Override + diff cells
// ---------------------------------------------------------------------------

/// One authoritative monthly value, already rounded to an integer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationOverride {
    pub submarket: SubmarketCode,
    pub year: i32,
    pub month: u32,
    pub weighted_value: f64,
}

/// One signed difference between two snapshots. `submarket == None` means the
/// system total (FC excluded).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiffCell {
    pub submarket: Option<SubmarketCode>,
    pub year: i32,
    pub month: u32,
    pub delta: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn record_carries_full_column_set_with_nulls() {
        let row = NormalizedRow::new(
            Entity::Sistema,
            Some(SubmarketCode::Ne),
            2025,
            3,
            d(2025, 2, 1),
            Version::Preliminar,
        )
        .with_metric(columns::GERACAO_EOL, 1234.0);

        let rec = row.to_record();
        assert_eq!(rec[columns::SUBMERCADO], Value::from(3));
        assert_eq!(rec[columns::GERACAO_EOL], Value::from(1234.0));
        assert_eq!(rec[columns::ENERGIA_TOTAL], Value::Null);
        assert_eq!(rec[columns::VERSAO], Value::from("preliminar"));
        assert_eq!(rec[columns::DT_DECK], Value::from("2025-02-01"));
    }

    #[test]
    fn row_json_roundtrip_keeps_tags() {
        let row = NormalizedRow::new(
            Entity::PatamarLoad,
            Some(SubmarketCode::S),
            2026,
            1,
            d(2025, 12, 1),
            Version::Definitivo,
        )
        .with_block(Block::Leve)
        .with_category(RowCategory::Generation(GenerationCategory::UfvMmgd))
        .with_metric(columns::VALOR_PU, 0.81);

        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("\"UFV MMGD\""));
        assert!(json.contains("\"LEVE\""));
        let back: NormalizedRow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn key_distinguishes_category() {
        let base = NormalizedRow::new(
            Entity::PatamarLoad,
            Some(SubmarketCode::Se),
            2026,
            1,
            d(2025, 12, 1),
            Version::Definitivo,
        )
        .with_block(Block::Pesado);
        let a = base.clone().with_category(RowCategory::Carga);
        let b = base.with_category(RowCategory::Generation(GenerationCategory::Pch));
        assert_ne!(a.key(), b.key());
    }
}
