use std::fmt;
use std::io;

use crate::cursor::MonthCursor;

// ---------------------------------------------------------------------------
// Truncation evidence
// ---------------------------------------------------------------------------

/// The archive ended in the middle of a record.
///
/// Everything before `record_index` was decoded and emitted; nothing from the
/// trailing partial record was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncatedRecord {
    /// 0-based index of the incomplete record.
    pub record_index: usize,
    /// Month the incomplete record would have covered.
    pub month: MonthCursor,
    /// Bytes present for the incomplete record (`0 < bytes_read < RECORD_BYTES`).
    pub bytes_read: usize,
    /// Observations emitted before the truncation (`record_index * STATION_COUNT`).
    pub observations_emitted: usize,
}

// ---------------------------------------------------------------------------
// Encode-side validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A month group does not hold exactly one value per station.
    IncompleteMonth { month: MonthCursor, stations: usize },
    /// A station id outside `1..=320`, or repeated within a month.
    BadStation { month: MonthCursor, station: u16 },
    /// Months are not contiguous from the epoch.
    NonContiguous { expected: MonthCursor, got: MonthCursor },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::IncompleteMonth { month, stations } => {
                write!(f, "month {month} has {stations} stations, expected 320")
            }
            FormatError::BadStation { month, station } => {
                write!(f, "month {month}: station {station} out of range or repeated")
            }
            FormatError::NonContiguous { expected, got } => {
                write!(f, "months not contiguous: expected {expected}, got {got}")
            }
        }
    }
}

impl std::error::Error for FormatError {}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced by the archive codec.
#[derive(Debug)]
pub enum ArchiveError {
    /// Trailing partial record. Recoverable: the leading complete records are valid.
    Truncated(TruncatedRecord),
    /// I/O failure from the underlying reader or writer.
    Stream(io::Error),
    /// Observations handed to the encoder do not form a valid archive.
    Format(FormatError),
}

impl ArchiveError {
    pub fn is_truncated(&self) -> bool {
        matches!(self, ArchiveError::Truncated(_))
    }
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::Truncated(t) => write!(
                f,
                "truncated record {} ({}): {} of {} bytes present; {} observations emitted before it",
                t.record_index,
                t.month,
                t.bytes_read,
                crate::RECORD_BYTES,
                t.observations_emitted
            ),
            ArchiveError::Stream(e) => write!(f, "archive stream error: {e}"),
            ArchiveError::Format(e) => write!(f, "archive format error: {e}"),
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArchiveError::Stream(e) => Some(e),
            ArchiveError::Format(e) => Some(e),
            ArchiveError::Truncated(_) => None,
        }
    }
}

impl From<io::Error> for ArchiveError {
    fn from(e: io::Error) -> Self {
        ArchiveError::Stream(e)
    }
}

impl From<FormatError> for ArchiveError {
    fn from(e: FormatError) -> Self {
        ArchiveError::Format(e)
    }
}
