//! dk-schemas
//!
//! Shared data model for the deck reconciliation engine: the submarket
//! registry, the canonical normalized row, and the closed category lookups
//! every normalizer maps free text through.
//!
//! No IO. Everything here is plain data plus total, pure conversions.

pub mod category;
pub mod columns;
pub mod row;
pub mod submarket;

pub use category::{CadicCategory, GenerationCategory};
pub use row::{Block, BlockTag, DiffCell, Entity, NormalizedRow, ReconciliationOverride, RowCategory, RowKey, Version};
pub use submarket::{RegistryError, SubmarketCode};
