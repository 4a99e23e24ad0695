//! Typed view over the merged config JSON.
//!
//! Every key is optional; a missing key falls back to the default below. A
//! key that is present with the wrong type is an error, never a silent default.

use anyhow::{bail, Result};
use dk_schemas::{columns, Entity};
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v2";
pub const DEFAULT_FEED_PATH: &str = "decks/weol/weighted-average/week";
pub const DEFAULT_TOKEN_ENV: &str = "DK_API_TOKEN";

/// Persistence sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// NAME of the env var holding the bearer token.
    pub token_env: String,
}

/// Weekly weighted-average forecast feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedConfig {
    pub base_url: String,
    pub path: String,
    pub token_env: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileSettings {
    pub target_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffSettings {
    pub decimals: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveSettings {
    /// Treat a truncated archive tail as an error instead of a partial result.
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineConfig {
    pub api: ApiConfig,
    pub feed: FeedConfig,
    pub reconcile: ReconcileSettings,
    pub diff: DiffSettings,
    pub archive: ArchiveSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: DEFAULT_API_BASE_URL.to_string(),
                token_env: DEFAULT_TOKEN_ENV.to_string(),
            },
            feed: FeedConfig {
                base_url: DEFAULT_API_BASE_URL.to_string(),
                path: DEFAULT_FEED_PATH.to_string(),
                token_env: DEFAULT_TOKEN_ENV.to_string(),
            },
            reconcile: ReconcileSettings {
                target_column: columns::GERACAO_EOL.to_string(),
            },
            diff: DiffSettings { decimals: 0 },
            archive: ArchiveSettings { strict: false },
        }
    }
}

impl EngineConfig {
    pub fn from_json(config_json: &Value) -> Result<Self> {
        let d = Self::default();

        let target_column = str_at(config_json, "/reconcile/target_column")?
            .unwrap_or(d.reconcile.target_column);
        if !Entity::Sistema.metric_columns().iter().any(|c| *c == target_column) {
            bail!("CONFIG_INVALID /reconcile/target_column: '{target_column}' is not a SISTEMA column");
        }

        let decimals = match config_json.pointer("/diff/decimals") {
            None | Some(Value::Null) => d.diff.decimals,
            Some(v) => match v.as_u64() {
                Some(n) if n <= 12 => n as usize,
                _ => bail!("CONFIG_INVALID /diff/decimals: expected an integer in 0..=12"),
            },
        };

        let strict = match config_json.pointer("/archive/strict") {
            None | Some(Value::Null) => d.archive.strict,
            Some(Value::Bool(b)) => *b,
            Some(_) => bail!("CONFIG_INVALID /archive/strict: expected a boolean"),
        };

        Ok(Self {
            api: ApiConfig {
                base_url: str_at(config_json, "/api/base_url")?.unwrap_or(d.api.base_url),
                token_env: str_at(config_json, "/api/token_env")?.unwrap_or(d.api.token_env),
            },
            feed: FeedConfig {
                base_url: str_at(config_json, "/feed/base_url")?.unwrap_or(d.feed.base_url),
                path: str_at(config_json, "/feed/path")?.unwrap_or(d.feed.path),
                token_env: str_at(config_json, "/feed/token_env")?.unwrap_or(d.feed.token_env),
            },
            reconcile: ReconcileSettings { target_column },
            diff: DiffSettings { decimals },
            archive: ArchiveSettings { strict },
        })
    }
}

/// Non-blank string at `pointer`; absent, null and blank read as `None`.
fn str_at(config: &Value, pointer: &str) -> Result<Option<String>> {
    match config.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(_) => bail!("CONFIG_INVALID {pointer}: expected a string"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_config_yields_defaults() {
        let c = EngineConfig::from_json(&json!({})).unwrap();
        assert_eq!(c, EngineConfig::default());
        assert_eq!(c.reconcile.target_column, "vl_geracao_eol");
    }

    #[test]
    fn present_keys_override_defaults() {
        let c = EngineConfig::from_json(&json!({
            "feed": {"base_url": "http://feed.local", "path": "weol"},
            "diff": {"decimals": 1},
            "archive": {"strict": true}
        }))
        .unwrap();
        assert_eq!(c.feed.base_url, "http://feed.local");
        assert_eq!(c.feed.path, "weol");
        assert_eq!(c.feed.token_env, DEFAULT_TOKEN_ENV);
        assert_eq!(c.diff.decimals, 1);
        assert!(c.archive.strict);
        assert_eq!(c.api.base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(EngineConfig::from_json(&json!({"archive": {"strict": "yes"}})).is_err());
        assert!(EngineConfig::from_json(&json!({"diff": {"decimals": -1}})).is_err());
        assert!(EngineConfig::from_json(&json!({"api": {"base_url": 3}})).is_err());
    }

    #[test]
    fn target_column_must_be_a_sistema_column() {
        let err = EngineConfig::from_json(&json!({"reconcile": {"target_column": "vl_mmgd_se"}}))
            .unwrap_err();
        assert!(err.to_string().contains("target_column"));
    }
}
