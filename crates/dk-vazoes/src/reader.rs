//! Decode side of the archive codec.

use std::io::{self, Read};
use std::iter::FusedIterator;

use tracing::{debug, warn};

use crate::cursor::MonthCursor;
use crate::error::{ArchiveError, TruncatedRecord};
use crate::{Observation, EPOCH, RECORD_BYTES, STATION_COUNT};

// ---------------------------------------------------------------------------
// Lazy reader
// ---------------------------------------------------------------------------

/// Lazy, forward-only decoder over an archive byte stream.
///
/// Yields one `Ok(Observation)` per station per month. The stream ends with
/// `None` on a clean EOF at a record boundary. A trailing partial record
/// yields exactly one `Err(ArchiveError::Truncated(..))` and then `None`; none
/// of its bytes are emitted as observations. An I/O error yields one
/// `Err(ArchiveError::Stream(..))` and then `None`.
///
/// Not restartable: re-open the source to iterate again.
pub struct ArchiveReader<R> {
    inner: R,
    buf: Box<[u8]>,
    /// Next station slot to emit from `buf`; `STATION_COUNT` means "refill".
    pos: usize,
    /// Month of the record currently held in `buf`.
    cursor: MonthCursor,
    /// Complete records loaded so far.
    records: usize,
    done: bool,
}

/// Start decoding `inner`. Nothing is read until the first `next()`.
pub fn decode<R: Read>(inner: R) -> ArchiveReader<R> {
    ArchiveReader::new(inner)
}

impl<R: Read> ArchiveReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: vec![0u8; RECORD_BYTES].into_boxed_slice(),
            pos: STATION_COUNT,
            cursor: EPOCH,
            records: 0,
            done: false,
        }
    }

    /// Complete records decoded so far.
    pub fn records_read(&self) -> usize {
        self.records
    }

    /// Fill `buf` as far as the stream allows. Returns the byte count.
    fn read_record(&mut self) -> io::Result<usize> {
        let mut filled = 0;
        while filled < RECORD_BYTES {
            match self.inner.read(&mut self.buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    /// Load the next record. `Ok(false)` on clean EOF.
    fn refill(&mut self) -> Result<bool, ArchiveError> {
        let next_month = if self.records == 0 {
            self.cursor
        } else {
            self.cursor.next()
        };

        let n = self.read_record()?;
        if n == 0 {
            debug!(records = self.records, "archive clean eof");
            return Ok(false);
        }
        if n < RECORD_BYTES {
            let t = TruncatedRecord {
                record_index: self.records,
                month: next_month,
                bytes_read: n,
                observations_emitted: self.records * STATION_COUNT,
            };
            warn!(
                record_index = t.record_index,
                month = %t.month,
                bytes_read = t.bytes_read,
                "archive ends mid-record; trailing record dropped"
            );
            return Err(ArchiveError::Truncated(t));
        }

        self.cursor = next_month;
        self.records += 1;
        self.pos = 0;
        Ok(true)
    }
}

impl<R: Read> Iterator for ArchiveReader<R> {
    type Item = Result<Observation, ArchiveError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.pos >= STATION_COUNT {
            match self.refill() {
                Ok(true) => {}
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        let i = self.pos * 4;
        let b = &self.buf[i..i + 4];
        let value = i32::from_le_bytes([b[0], b[1], b[2], b[3]]);
        self.pos += 1;

        Some(Ok(Observation {
            station: self.pos as u16,
            year: self.cursor.year,
            month: self.cursor.month,
            value,
        }))
    }
}

impl<R: Read> FusedIterator for ArchiveReader<R> {}

// ---------------------------------------------------------------------------
// Eager helpers
// ---------------------------------------------------------------------------

/// Result of a lenient decode: the complete leading records plus the
/// truncation evidence, if the stream ended mid-record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOutcome {
    pub observations: Vec<Observation>,
    pub records: usize,
    pub truncated: Option<TruncatedRecord>,
}

impl DecodeOutcome {
    pub fn is_complete(&self) -> bool {
        self.truncated.is_none()
    }

    /// First and last month covered, if any record was decoded.
    pub fn span(&self) -> Option<(MonthCursor, MonthCursor)> {
        if self.records == 0 {
            return None;
        }
        Some((EPOCH, EPOCH.offset(self.records - 1)))
    }
}

/// Decode everything. Any truncation or stream error fails the whole call.
pub fn decode_all<R: Read>(inner: R) -> Result<Vec<Observation>, ArchiveError> {
    decode(inner).collect()
}

/// Decode everything, keeping the complete leading records when the stream
/// ends mid-record. Stream errors still fail the call.
pub fn decode_lenient<R: Read>(inner: R) -> Result<DecodeOutcome, ArchiveError> {
    let mut reader = decode(inner);
    let mut observations = Vec::new();
    let mut truncated = None;

    for item in reader.by_ref() {
        match item {
            Ok(o) => observations.push(o),
            Err(ArchiveError::Truncated(t)) => truncated = Some(t),
            Err(e) => return Err(e),
        }
    }

    Ok(DecodeOutcome {
        observations,
        records: reader.records_read(),
        truncated,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
