//! Consumed-pointer registry: which config leaves each command family reads.
//!
//! Pointers are JSON Pointer prefixes. A prefix consumes every leaf below it,
//! so "/feed" would consume "/feed/path". Only list what the code actually
//! reads in that mode.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigMode {
    /// Deck normalization and load updates, optionally published to the sink.
    Ingest,
    /// Forecast feed fetch + override application.
    Reconcile,
    /// Snapshot diff rendering.
    Report,
}

impl ConfigMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigMode::Ingest => "INGEST",
            ConfigMode::Reconcile => "RECONCILE",
            ConfigMode::Report => "REPORT",
        }
    }
}

// Observed reads:
// - dk-cli deck normalize / load-update (--publish): EngineConfig.api, token via /api/token_env
// - dk-cli vazoes decode: EngineConfig.archive.strict
// - dk-cli reconcile: EngineConfig.feed, EngineConfig.reconcile, token via /feed/token_env
// - dk-cli diff: EngineConfig.diff.decimals
static INGEST: &[&str] = &["/api/base_url", "/api/token_env", "/archive/strict"];

static RECONCILE: &[&str] = &[
    "/feed/base_url",
    "/feed/path",
    "/feed/token_env",
    "/reconcile/target_column",
];

static REPORT: &[&str] = &["/diff/decimals"];

pub fn consumed_pointers_for_mode(mode: ConfigMode) -> &'static [&'static str] {
    match mode {
        ConfigMode::Ingest => INGEST,
        ConfigMode::Reconcile => RECONCILE,
        ConfigMode::Report => REPORT,
    }
}
