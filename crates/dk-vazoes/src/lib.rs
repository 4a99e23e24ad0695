//! dk-vazoes
//!
//! Codec for the historical natural-inflow archive ("vazões").
//!
//! The archive is a headerless stream of fixed-width records. Each record is
//! [`STATION_COUNT`] little-endian `i32` values, one per station in station
//! order, and record `k` (0-based) belongs to the month `k` months after
//! January 1931. There is no length prefix, footer, or checksum: the date of a
//! value is derived purely from its position.
//!
//! Reading is a single forward pass over any [`std::io::Read`]. The codec holds
//! no state beyond the local month cursor, so a caller can stop iterating at
//! any point.

mod cursor;
mod error;
mod reader;
mod writer;

pub use cursor::MonthCursor;
pub use error::{ArchiveError, FormatError, TruncatedRecord};
pub use reader::{decode, decode_all, decode_lenient, ArchiveReader, DecodeOutcome};
pub use writer::encode;

use serde::{Deserialize, Serialize};

/// Stations per monthly record.
pub const STATION_COUNT: usize = 320;

/// Bytes per monthly record.
pub const RECORD_BYTES: usize = STATION_COUNT * 4;

/// Month of the first record.
pub const EPOCH: MonthCursor = MonthCursor { year: 1931, month: 1 };

/// One monthly inflow value for one station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Observation {
    /// 1-based station position within the record (`1..=320`).
    pub station: u16,
    pub year: i32,
    pub month: u32,
    pub value: i32,
}
