//! Deck decoder boundary.
//!
//! Tokenizing the proprietary deck grammar is not done here. A decoder only
//! has to produce the labeled tables of [`crate::tables`]; the normalizers
//! never see anything else.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::DecoderError;
use crate::tables::{
    CadicTables, PatamarTables, SistemaTables, BLOCK_DURATION, BLOCK_EXCHANGE, BLOCK_LOAD,
    BLOCK_UNSIMULATED, CADIC_LOADS, MARKET_ENERGY, UNSIMULATED_GENERATION,
};

/// Capability interface over an external deck-format decoder.
pub trait DeckDecoder {
    fn sistema(&self, path: &Path) -> Result<SistemaTables, DecoderError>;
    fn cadic(&self, path: &Path) -> Result<CadicTables, DecoderError>;
    fn patamar(&self, path: &Path) -> Result<PatamarTables, DecoderError>;
}

/// Reads tables that an external tokenizer already dumped to JSON.
///
/// File shape: one object keyed by table name, each value an array of
/// records, e.g. `{"market_energy": [{"submarket": 1, "date": "2025-03-01", "value": 41000.0}]}`.
/// Unknown keys are ignored. `block_unsimulated` may be omitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDeckDecoder;

impl JsonDeckDecoder {
    pub fn new() -> Self {
        Self
    }

    fn load(&self, path: &Path) -> Result<Map<String, Value>, DecoderError> {
        let raw = fs::read_to_string(path).map_err(|source| DecoderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let doc: Value = serde_json::from_str(&raw).map_err(|e| DecoderError::Decode {
            path: path.to_path_buf(),
            table: "<root>".to_string(),
            message: e.to_string(),
        })?;
        match doc {
            Value::Object(m) => {
                debug!(path = %path.display(), tables = m.len(), "decoded deck loaded");
                Ok(m)
            }
            _ => Err(DecoderError::Decode {
                path: path.to_path_buf(),
                table: "<root>".to_string(),
                message: "expected an object keyed by table name".to_string(),
            }),
        }
    }
}

fn take_table<T: DeserializeOwned>(
    path: &Path,
    doc: &mut Map<String, Value>,
    name: &'static str,
    required: bool,
) -> Result<Vec<T>, DecoderError> {
    match doc.remove(name) {
        None if required => Err(DecoderError::MissingTable {
            path: path.to_path_buf(),
            table: name,
        }),
        None => Ok(Vec::new()),
        Some(v) => serde_json::from_value(v).map_err(|e| DecoderError::Decode {
            path: path.to_path_buf(),
            table: name.to_string(),
            message: e.to_string(),
        }),
    }
}

impl DeckDecoder for JsonDeckDecoder {
    fn sistema(&self, path: &Path) -> Result<SistemaTables, DecoderError> {
        let mut doc = self.load(path)?;
        Ok(SistemaTables {
            market_energy: take_table(path, &mut doc, MARKET_ENERGY, true)?,
            unsimulated_generation: take_table(path, &mut doc, UNSIMULATED_GENERATION, true)?,
        })
    }

    fn cadic(&self, path: &Path) -> Result<CadicTables, DecoderError> {
        let mut doc = self.load(path)?;
        Ok(CadicTables {
            cadic_loads: take_table(path, &mut doc, CADIC_LOADS, true)?,
        })
    }

    fn patamar(&self, path: &Path) -> Result<PatamarTables, DecoderError> {
        let mut doc = self.load(path)?;
        Ok(PatamarTables {
            block_load: take_table(path, &mut doc, BLOCK_LOAD, true)?,
            block_duration: take_table(path, &mut doc, BLOCK_DURATION, true)?,
            block_exchange: take_table(path, &mut doc, BLOCK_EXCHANGE, true)?,
            block_unsimulated: take_table(path, &mut doc, BLOCK_UNSIMULATED, false)?,
        })
    }
}
