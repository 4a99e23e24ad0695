use std::fmt;
use std::io;
use std::path::PathBuf;

use dk_schemas::RegistryError;

// ---------------------------------------------------------------------------
// Normalization errors
// ---------------------------------------------------------------------------

/// Errors raised while turning decoded deck tables into normalized rows.
///
/// Every variant names the deck section (`SISTEMA`, `CADIC`, `PATAMAR`,
/// `CARGA_MENSAL`) so the caller can log and abort that one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// Filename carries no recognised version token.
    UnrecognizedVersion { filename: String },
    /// A required table is empty, or nothing survived input filtering.
    EmptyExtract {
        section: &'static str,
        table: &'static str,
    },
    /// Free-text category outside the closed lookup.
    UnknownCategory {
        section: &'static str,
        label: String,
    },
    /// Block / source index outside the known range.
    UnknownBlock {
        section: &'static str,
        table: &'static str,
        index: i64,
    },
    Registry {
        section: &'static str,
        source: RegistryError,
    },
    /// Two output rows share the same identity.
    DuplicateRow { section: &'static str, key: String },
}

impl NormalizeError {
    pub fn section(&self) -> Option<&'static str> {
        match self {
            NormalizeError::UnrecognizedVersion { .. } => None,
            NormalizeError::EmptyExtract { section, .. }
            | NormalizeError::UnknownCategory { section, .. }
            | NormalizeError::UnknownBlock { section, .. }
            | NormalizeError::Registry { section, .. }
            | NormalizeError::DuplicateRow { section, .. } => Some(section),
        }
    }
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeError::UnrecognizedVersion { filename } => write!(
                f,
                "cannot resolve deck version from filename '{filename}': \
                 expected 'preliminar' or 'definitivo'"
            ),
            NormalizeError::EmptyExtract { section, table } => {
                write!(f, "{section}: table '{table}' is missing or empty")
            }
            NormalizeError::UnknownCategory { section, label } => {
                write!(f, "{section}: unknown category '{label}'")
            }
            NormalizeError::UnknownBlock {
                section,
                table,
                index,
            } => write!(f, "{section}: table '{table}' has unknown block index {index}"),
            NormalizeError::Registry { section, source } => write!(f, "{section}: {source}"),
            NormalizeError::DuplicateRow { section, key } => {
                write!(f, "{section}: duplicate row identity {key}")
            }
        }
    }
}

impl std::error::Error for NormalizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NormalizeError::Registry { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder errors
// ---------------------------------------------------------------------------

/// Errors raised by a [`crate::DeckDecoder`].
#[derive(Debug)]
pub enum DecoderError {
    Io { path: PathBuf, source: io::Error },
    Decode {
        path: PathBuf,
        table: String,
        message: String,
    },
    MissingTable { path: PathBuf, table: &'static str },
}

impl fmt::Display for DecoderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecoderError::Io { path, source } => {
                write!(f, "read decoded deck '{}': {source}", path.display())
            }
            DecoderError::Decode {
                path,
                table,
                message,
            } => write!(
                f,
                "decode table '{table}' in '{}': {message}",
                path.display()
            ),
            DecoderError::MissingTable { path, table } => {
                write!(f, "table '{table}' missing from '{}'", path.display())
            }
        }
    }
}

impl std::error::Error for DecoderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecoderError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
