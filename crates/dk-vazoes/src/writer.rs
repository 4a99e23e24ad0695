//! Encode side of the archive codec.
//!
//! Used to rebuild an archive from an edited export. The archive carries no
//! dates, so the encoder refuses anything that would not decode back to the
//! same (station, month) positions.

use std::io::Write;

use tracing::debug;

use crate::cursor::MonthCursor;
use crate::error::{ArchiveError, FormatError};
use crate::{Observation, EPOCH, RECORD_BYTES, STATION_COUNT};

/// Write `observations` as archive records. Returns the number of records
/// written.
///
/// Observations are grouped by consecutive (year, month) in input order.
/// Months must run contiguously from January 1931 and each month must hold
/// every station `1..=320` exactly once; station order inside a month is free.
/// Validation happens per month before that month is written, so a failure
/// leaves only whole records behind.
pub fn encode<W: Write>(observations: &[Observation], mut out: W) -> Result<usize, ArchiveError> {
    let mut expected = EPOCH;
    let mut records = 0usize;
    let mut buf = vec![0u8; RECORD_BYTES];

    for group in observations.chunk_by(|a, b| (a.year, a.month) == (b.year, b.month)) {
        let month = MonthCursor::new(group[0].year, group[0].month);
        if month != expected {
            return Err(FormatError::NonContiguous { expected, got: month }.into());
        }
        if group.len() != STATION_COUNT {
            return Err(FormatError::IncompleteMonth {
                month,
                stations: group.len(),
            }
            .into());
        }

        let mut seen = [false; STATION_COUNT];
        for o in group {
            let slot = usize::from(o.station).wrapping_sub(1);
            if slot >= STATION_COUNT || seen[slot] {
                return Err(FormatError::BadStation {
                    month,
                    station: o.station,
                }
                .into());
            }
            seen[slot] = true;
            buf[slot * 4..slot * 4 + 4].copy_from_slice(&o.value.to_le_bytes());
        }

        out.write_all(&buf)?;
        records += 1;
        expected.advance();
    }

    out.flush()?;
    debug!(records, "archive encoded");
    Ok(records)
}
