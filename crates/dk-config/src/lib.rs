//! dk-config
//!
//! Layered YAML configuration for the reconciliation engine.
//!
//! - Documents merge in order (later overrides earlier, mappings merge deeply).
//! - The merged tree is converted to JSON and hashed (sha256 of canonical JSON)
//!   so every run can print the exact config it used.
//! - Literal secrets are rejected: YAML stores env var NAMES only.
//! - `report_unused_keys` flags leaves no command in the chosen mode reads.
//!
//! It does **not**:
//! - read environment variables (see [`secrets`])
//! - hold a process-wide config; callers pass [`EngineConfig`] sub-structs down

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;
use tracing::{debug, warn};

mod consumption;
pub mod secrets;
mod settings;

pub use consumption::{consumed_pointers_for_mode, ConfigMode};
pub use settings::{
    ApiConfig, ArchiveSettings, DiffSettings, EngineConfig, FeedConfig, ReconcileSettings,
    DEFAULT_API_BASE_URL, DEFAULT_FEED_PATH, DEFAULT_TOKEN_ENV,
};

/// Leading text of credentials people paste into YAML by mistake. A leaf
/// starting with one of these fails the load with CONFIG_SECRET_DETECTED.
const SECRET_PREFIXES: &[&str] = &[
    "Bearer ", "eyJ", "sk-", "AKIA", "-----BEGIN", "ghp_", "glpat-", "xoxb-",
];

// ---------------------------------------------------------------------------
// Leaf walk
// ---------------------------------------------------------------------------

/// Every scalar leaf of `root` as (JSON pointer, value), in key order.
/// Object keys are escaped per RFC 6901; array items use their index.
fn leaves(root: &Value) -> Vec<(String, &Value)> {
    let mut out = Vec::new();
    let mut stack: Vec<(String, &Value)> = vec![(String::new(), root)];
    while let Some((at, v)) = stack.pop() {
        match v {
            Value::Object(map) => {
                for (k, child) in map.iter().rev() {
                    let token = k.replace('~', "~0").replace('/', "~1");
                    stack.push((format!("{at}/{token}"), child));
                }
            }
            Value::Array(items) => {
                for (i, child) in items.iter().enumerate().rev() {
                    stack.push((format!("{at}/{i}"), child));
                }
            }
            scalar => {
                let at = if at.is_empty() { "/".to_string() } else { at };
                out.push((at, scalar));
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Unused-key report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    pub mode: String,
    /// Pointer prefixes the mode reads, sorted.
    pub consumed_prefixes: Vec<String>,
    /// Leaves no prefix covers, sorted.
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }

    fn preview(&self) -> String {
        let shown: Vec<&str> = self
            .unused_leaf_pointers
            .iter()
            .take(12)
            .map(String::as_str)
            .collect();
        shown.join(", ")
    }
}

/// Consumed prefixes of one mode, in canonical `/a/b` form.
struct ConsumedSet(BTreeSet<String>);

impl ConsumedSet {
    fn for_mode(mode: ConfigMode) -> Self {
        let canonical = consumed_pointers_for_mode(mode).iter().map(|p| {
            let body = p.trim().trim_matches('/');
            format!("/{body}")
        });
        Self(canonical.collect())
    }

    /// `/a/b` covers `/a/b` and `/a/b/c`, never `/a/bc`. `/` covers everything.
    fn covers(&self, leaf: &str) -> bool {
        self.0.iter().any(|prefix| {
            prefix == "/"
                || leaf == prefix
                || leaf
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

/// Compare the config's leaves with what `mode` reads.
///
/// `Fail` turns a non-empty report into `CONFIG_UNUSED_KEYS`; `Warn` logs it
/// and returns it.
pub fn report_unused_keys(
    mode: ConfigMode,
    config_json: &Value,
    policy: UnusedKeyPolicy,
) -> Result<UnusedKeyReport> {
    let consumed = ConsumedSet::for_mode(mode);
    let unused: BTreeSet<String> = leaves(config_json)
        .into_iter()
        .map(|(at, _)| at)
        .filter(|at| !consumed.covers(at))
        .collect();

    let report = UnusedKeyReport {
        mode: mode.as_str().to_string(),
        consumed_prefixes: consumed.0.into_iter().collect(),
        unused_leaf_pointers: unused.into_iter().collect(),
    };

    if report.is_clean() {
        return Ok(report);
    }
    match policy {
        UnusedKeyPolicy::Fail => bail!(
            "CONFIG_UNUSED_KEYS (mode={}): {} key(s) not read by this mode: {}",
            report.mode,
            report.unused_leaf_pointers.len(),
            report.preview()
        ),
        UnusedKeyPolicy::Warn => {
            warn!(
                mode = %report.mode,
                count = report.unused_leaf_pointers.len(),
                keys = %report.preview(),
                "config keys not read in this mode"
            );
            Ok(report)
        }
    }
}

// ---------------------------------------------------------------------------
// Layered load
// ---------------------------------------------------------------------------

/// Effective config of one run.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// sha256 hex of `canonical_json`.
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

/// Read each path and merge them in order. See [`load_layered_yaml_from_strings`].
pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let docs = paths
        .iter()
        .map(|p| fs::read_to_string(p).with_context(|| format!("read config layer failed: {p}")))
        .collect::<Result<Vec<String>>>()?;
    let doc_refs: Vec<&str> = docs.iter().map(String::as_str).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = Value::Object(serde_json::Map::new());
    for (layer, raw) in yaml_docs.iter().enumerate() {
        let doc: serde_yaml::Value = serde_yaml::from_str(raw)
            .with_context(|| format!("config layer {layer} is not valid yaml"))?;
        // Empty document: nothing to merge.
        if doc.is_null() {
            continue;
        }
        let doc = serde_json::to_value(doc)
            .with_context(|| format!("config layer {layer} has no json form"))?;
        merge_into(&mut merged, doc);
    }

    reject_secret_literals(&merged)?;

    // serde_json::Map is key-sorted here (no preserve_order), so compact
    // output is canonical.
    let canonical_json = serde_json::to_string(&merged).context("canonical json serialize failed")?;
    let config_hash = hex::encode(Sha256::digest(canonical_json.as_bytes()));
    debug!(layers = yaml_docs.len(), %config_hash, "config loaded");
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

/// Mappings merge key by key; anything else in `upper` replaces `base`.
fn merge_into(base: &mut Value, upper: Value) {
    match (base, upper) {
        (Value::Object(base_map), Value::Object(upper_map)) => {
            for (k, v) in upper_map {
                match base_map.get_mut(&k) {
                    Some(slot) => merge_into(slot, v),
                    None => {
                        base_map.insert(k, v);
                    }
                }
            }
        }
        (slot, v) => *slot = v,
    }
}

fn reject_secret_literals(root: &Value) -> Result<()> {
    for (at, v) in leaves(root) {
        if v.as_str().is_some_and(looks_like_secret) {
            bail!("CONFIG_SECRET_DETECTED leaf={at} value=REDACTED");
        }
    }
    Ok(())
}

/// Short strings are never flagged, so `sk-1` style ids stay usable.
fn looks_like_secret(s: &str) -> bool {
    let t = s.trim_start();
    t.len() >= 8 && SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumed_prefix_respects_segment_boundary() {
        let set = ConsumedSet(["/feed".to_string()].into_iter().collect());
        assert!(set.covers("/feed/path"));
        assert!(set.covers("/feed"));
        assert!(!set.covers("/feedback/x"));
        assert!(ConsumedSet(["/".to_string()].into_iter().collect()).covers("/anything"));
    }

    #[test]
    fn pointer_tokens_are_escaped() {
        let v = serde_json::json!({"a/b": {"c~d": 1}, "list": [true, null]});
        let at: Vec<String> = leaves(&v).into_iter().map(|(p, _)| p).collect();
        assert_eq!(at, vec!["/a~1b/c~0d", "/list/0", "/list/1"]);
    }

    #[test]
    fn jwt_literal_is_a_secret_but_env_name_is_not() {
        assert!(looks_like_secret("eyJhbGciOiJIUzI1NiJ9.payload.sig"));
        assert!(looks_like_secret("Bearer abcdefgh"));
        assert!(!looks_like_secret("DK_API_TOKEN"));
        assert!(!looks_like_secret("sk-1"));
    }

    #[test]
    fn later_layer_overrides_scalar_and_keeps_siblings() {
        let c = load_layered_yaml_from_strings(&[
            "feed:\n  path: a\n  token_env: X_TOKEN\n",
            "feed:\n  path: b\n",
        ])
        .unwrap();
        assert_eq!(c.config_json.pointer("/feed/path"), Some(&Value::from("b")));
        assert_eq!(c.config_json.pointer("/feed/token_env"), Some(&Value::from("X_TOKEN")));
    }

    #[test]
    fn empty_layer_is_ignored() {
        let a = load_layered_yaml_from_strings(&["diff:\n  decimals: 2\n", ""]).unwrap();
        assert_eq!(a.config_json.pointer("/diff/decimals"), Some(&Value::from(2)));
    }
}
