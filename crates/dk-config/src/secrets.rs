//! Runtime token resolution.
//!
//! Rules:
//! - Config YAML stores only **env var NAMES** (e.g. `"DK_API_TOKEN"`).
//! - Callers invoke [`resolve_api_token`] once per command and hand the
//!   result to the HTTP client constructor; nothing else reads the environment.
//! - `Debug` on [`ApiToken`] **redacts** the value.
//! - Error messages reference the env var **NAME**, never the value.
//!
//! Which token each mode needs:
//! - `INGEST`:    token named by `/api/token_env` is **required** (sink).
//! - `RECONCILE`: token named by `/feed/token_env` is **required** (feed).
//! - `REPORT`:    no token; diffs never leave the process.

use anyhow::{bail, Result};
use serde_json::Value;

use crate::{ConfigMode, DEFAULT_TOKEN_ENV};

/// A bearer token resolved from the environment. **Redacted in `Debug`.**
#[derive(Clone)]
pub struct ApiToken {
    var_name: String,
    value: String,
}

impl ApiToken {
    /// Name of the env var the token came from.
    pub fn var_name(&self) -> &str {
        &self.var_name
    }

    /// The raw token, for building the auth header.
    pub fn expose(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiToken")
            .field("var_name", &self.var_name)
            .field("value", &"<REDACTED>")
            .finish()
    }
}

/// Trimmed, non-blank text, or `None`.
fn non_blank(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

/// Resolve the bearer token the given mode needs.
///
/// Returns `Ok(None)` for `REPORT`. For the other modes a missing or blank
/// variable is an error naming the variable.
pub fn resolve_api_token(config_json: &Value, mode: ConfigMode) -> Result<Option<ApiToken>> {
    let (pointer, purpose) = match mode {
        ConfigMode::Ingest => ("/api/token_env", "persistence sink"),
        ConfigMode::Reconcile => ("/feed/token_env", "forecast feed"),
        ConfigMode::Report => return Ok(None),
    };
    let var_name = config_json
        .pointer(pointer)
        .and_then(Value::as_str)
        .and_then(non_blank)
        .unwrap_or_else(|| DEFAULT_TOKEN_ENV.to_string());

    match std::env::var(&var_name).ok().as_deref().and_then(non_blank) {
        Some(value) => Ok(Some(ApiToken { var_name, value })),
        None => bail!(
            "SECRETS_MISSING mode={}: required env var '{}' ({} token) is not set or empty",
            mode.as_str(),
            var_name,
            purpose,
        ),
    }
}
