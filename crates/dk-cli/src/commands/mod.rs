//! Command handler modules for the `dk` binary.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod deck;
pub mod diff;
pub mod reconcile;
pub mod vazoes;

use anyhow::{Context, Result};
use dk_api::{publish_by_table, HttpRowSink};
use dk_config::{report_unused_keys, ConfigMode, EngineConfig, LoadedConfig, UnusedKeyPolicy};
use dk_schemas::NormalizedRow;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Effective config for one command. With no `--config` paths every setting
/// is its default and there is no hash to print.
pub struct CommandConfig {
    pub loaded: Option<LoadedConfig>,
    pub engine: EngineConfig,
}

impl CommandConfig {
    pub fn load(paths: &[String], mode: ConfigMode) -> Result<Self> {
        if paths.is_empty() {
            return Ok(Self {
                loaded: None,
                engine: EngineConfig::default(),
            });
        }
        let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
        let loaded = dk_config::load_layered_yaml(&path_refs)?;
        report_unused_keys(mode, &loaded.config_json, UnusedKeyPolicy::Warn)?;
        let engine = EngineConfig::from_json(&loaded.config_json)?;
        println!("config_hash={}", loaded.config_hash);
        Ok(Self {
            loaded: Some(loaded),
            engine,
        })
    }

    /// Config JSON for secret resolution; an empty object when no file was given.
    pub fn json(&self) -> serde_json::Value {
        self.loaded
            .as_ref()
            .map(|l| l.config_json.clone())
            .unwrap_or_else(|| serde_json::json!({}))
    }
}

// ---------------------------------------------------------------------------
// JSON files
// ---------------------------------------------------------------------------

/// Read a JSON document, tolerating a UTF-8 BOM (Windows editors add one).
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("read failed: {path}"))?;
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);
    serde_json::from_slice(bytes).with_context(|| format!("invalid JSON in {path}"))
}

pub fn read_rows(path: &str) -> Result<Vec<NormalizedRow>> {
    read_json(path)
}

pub fn write_rows(path: &Path, rows: &[NormalizedRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create dir failed: {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(rows).context("serialize rows failed")?;
    fs::write(path, json).with_context(|| format!("write failed: {}", path.display()))?;
    println!("rows_path={}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Publishing
// ---------------------------------------------------------------------------

/// Post `rows` table by table and print one line per table. Fails after
/// printing if any table failed.
pub async fn publish(cfg: &CommandConfig, rows: &[NormalizedRow]) -> Result<()> {
    let token = dk_config::secrets::resolve_api_token(&cfg.json(), ConfigMode::Ingest)?
        .context("ingest mode always resolves a token")?;
    let sink = HttpRowSink::new_with_base_url(
        token.expose().to_string(),
        cfg.engine.api.base_url.clone(),
    );

    let outcomes = publish_by_table(&sink, rows).await;
    let mut failed = 0usize;
    for o in &outcomes {
        match &o.result {
            Ok(()) => println!("table={} rows={} published=true", o.table, o.rows),
            Err(e) => {
                failed += 1;
                println!("table={} rows={} published=false error={}", o.table, o.rows, e);
            }
        }
    }
    println!("tables_ok={} tables_failed={}", outcomes.len() - failed, failed);

    if failed > 0 {
        anyhow::bail!(
            "PUBLISH_PARTIAL: {} of {} table(s) failed",
            failed,
            outcomes.len()
        );
    }
    Ok(())
}
