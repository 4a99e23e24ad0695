//! dk-reconcile
//!
//! Forecast reconciliation: replace a SISTEMA snapshot's wind-generation
//! column with the later, authoritative monthly weighted average.
//!
//! Override-with-fallback only:
//! - a row with a matching (submarket, year, month) override takes the override
//! - a row without one keeps its value unchanged
//! - the override never adds or removes rows
//!
//! Deterministic, pure logic. No IO. Fetching the weekly feed lives in `dk-api`.

mod engine;
mod series;

pub use engine::{reconcile, ForecastReconciler, OverrideChange, ReconcileOutcome, ReconcileReport, ReconcilerConfig};
pub use series::{OverrideSeries, WeeklyPoint};
