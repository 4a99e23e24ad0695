//! Version tag resolution from source filenames.

use chrono::NaiveDate;
use dk_schemas::Version;

use crate::error::NormalizeError;

/// Deck version from a deck filename. The filename must contain exactly one
/// of `preliminar` / `definitivo` (case-insensitive). Anything else is
/// rejected; the version is never defaulted.
pub fn resolve_deck_version(filename: &str) -> Result<Version, NormalizeError> {
    let lower = filename.to_lowercase();
    let preliminar = lower.contains("preliminar");
    let definitivo = lower.contains("definitivo");
    match (preliminar, definitivo) {
        (true, false) => Ok(Version::Preliminar),
        (false, true) => Ok(Version::Definitivo),
        _ => Err(NormalizeError::UnrecognizedVersion {
            filename: filename.to_string(),
        }),
    }
}

/// Version of a monthly load-forecast revision. The quadrimestral revision
/// is marked with `quad` in its filename; every other revision is preliminary.
pub fn resolve_load_revision_version(filename: &str) -> Version {
    if filename.to_lowercase().contains("quad") {
        Version::Quadrimestral
    } else {
        Version::Preliminar
    }
}

/// The pair of tags every normalized row of one snapshot carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotTag {
    pub deck_date: NaiveDate,
    pub version: Version,
}

impl SnapshotTag {
    pub fn new(deck_date: NaiveDate, version: Version) -> Self {
        Self { deck_date, version }
    }

    pub fn from_deck_filename(filename: &str, deck_date: NaiveDate) -> Result<Self, NormalizeError> {
        Ok(Self::new(deck_date, resolve_deck_version(filename)?))
    }
}
