//! dk-deck
//!
//! Deck snapshot normalization.
//!
//! This crate owns the decoder contract (labeled raw tables), the per-entity
//! normalizers, version tag resolution, and the monthly load-revision merge.
//! It does **not** talk to the network; callers hand normalized rows to
//! `dk-api` for publishing.

pub mod decoder;
pub mod error;
pub mod load_update;
pub mod normalizer;
pub mod quality;
pub mod tables;
pub mod version;

pub use decoder::{DeckDecoder, JsonDeckDecoder};
pub use error::{DecoderError, NormalizeError};
pub use load_update::{merge_quadrimestral, prepare_load_update, LoadUpdate};
pub use normalizer::{ensure_unique, normalize_cadic, normalize_patamar, normalize_sistema, PatamarRows};
pub use quality::{build_quality_report, QualityReport};
pub use tables::{
    BlockDurationRecord, BlockExchangeRecord, BlockLoadRecord, BlockUnsimulatedRecord,
    CadicLoadRecord, CadicTables, MarketEnergyRecord, MonthlyLoadForecastRecord, PatamarTables,
    SistemaTables, UnsimulatedGenerationRecord,
};
pub use version::{resolve_deck_version, resolve_load_revision_version, SnapshotTag};
