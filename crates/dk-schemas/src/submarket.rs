//! Submarket registry.
//!
//! Bidirectional, total mapping between the grid operator's submarket
//! mnemonics and their numeric codes. `FC` is the exchange-only sentinel: it
//! shows up in inter-submarket exchange tables but carries no load or
//! generation, so it must be filtered out before any system-wide aggregate.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Code
// ---------------------------------------------------------------------------

/// Closed set of submarket codes.
///
/// Serialized as the numeric code (`cd_submercado`), which is what the
/// persistence API and the deck decoder both speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum SubmarketCode {
    Se,
    S,
    Ne,
    N,
    /// Exchange-only sentinel ("fictício").
    Fc,
}

impl SubmarketCode {
    /// Every code, in numeric order.
    pub const ALL: [SubmarketCode; 5] = [
        SubmarketCode::Se,
        SubmarketCode::S,
        SubmarketCode::Ne,
        SubmarketCode::N,
        SubmarketCode::Fc,
    ];

    /// The four trading submarkets that carry load and generation.
    pub const LOAD_BEARING: [SubmarketCode; 4] = [
        SubmarketCode::Se,
        SubmarketCode::S,
        SubmarketCode::Ne,
        SubmarketCode::N,
    ];

    pub fn code(&self) -> i64 {
        match self {
            SubmarketCode::Se => 1,
            SubmarketCode::S => 2,
            SubmarketCode::Ne => 3,
            SubmarketCode::N => 4,
            SubmarketCode::Fc => 11,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            SubmarketCode::Se => "SE",
            SubmarketCode::S => "S",
            SubmarketCode::Ne => "NE",
            SubmarketCode::N => "N",
            SubmarketCode::Fc => "FC",
        }
    }

    pub fn from_code(code: i64) -> Result<Self, RegistryError> {
        match code {
            1 => Ok(SubmarketCode::Se),
            2 => Ok(SubmarketCode::S),
            3 => Ok(SubmarketCode::Ne),
            4 => Ok(SubmarketCode::N),
            11 => Ok(SubmarketCode::Fc),
            other => Err(RegistryError::UnknownCode(other)),
        }
    }

    /// Case-insensitive mnemonic lookup (`"se"`, `"SE"`, `" Se "` all work).
    pub fn from_mnemonic(s: &str) -> Result<Self, RegistryError> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SE" => Ok(SubmarketCode::Se),
            "S" => Ok(SubmarketCode::S),
            "NE" => Ok(SubmarketCode::Ne),
            "N" => Ok(SubmarketCode::N),
            "FC" => Ok(SubmarketCode::Fc),
            _ => Err(RegistryError::UnknownMnemonic(s.to_string())),
        }
    }

    /// Full region names used by the load-forecast spreadsheets
    /// (`SUDESTE`, `SUL`, `NORDESTE`, `NORTE`). FC has no region name.
    pub fn from_region_name(s: &str) -> Result<Self, RegistryError> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUDESTE" => Ok(SubmarketCode::Se),
            "SUL" => Ok(SubmarketCode::S),
            "NORDESTE" => Ok(SubmarketCode::Ne),
            "NORTE" => Ok(SubmarketCode::N),
            _ => Err(RegistryError::UnknownMnemonic(s.to_string())),
        }
    }

    /// `false` only for the FC sentinel.
    pub fn is_load_bearing(&self) -> bool {
        !matches!(self, SubmarketCode::Fc)
    }
}

impl fmt::Display for SubmarketCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl TryFrom<i64> for SubmarketCode {
    type Error = RegistryError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        SubmarketCode::from_code(code)
    }
}

impl From<SubmarketCode> for i64 {
    fn from(s: SubmarketCode) -> i64 {
        s.code()
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    UnknownMnemonic(String),
    UnknownCode(i64),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::UnknownMnemonic(m) => {
                write!(f, "unknown submarket mnemonic '{m}'. expected one of: SE | S | NE | N | FC")
            }
            RegistryError::UnknownCode(c) => {
                write!(f, "unknown submarket code {c}. expected one of: 1 | 2 | 3 | 4 | 11")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
