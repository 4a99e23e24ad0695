//! Mode-aware token resolution.
//!
//! Failure tests use sentinel env var names that are never set anywhere, so
//! no test needs to mutate the environment except the single success case,
//! which uses its own unique name.

use dk_config::secrets::resolve_api_token;
use dk_config::{load_layered_yaml_from_strings, ConfigMode};

fn load(yaml: &str) -> serde_json::Value {
    load_layered_yaml_from_strings(&[yaml])
        .expect("test yaml must parse cleanly")
        .config_json
}

#[test]
fn ingest_requires_the_sink_token() {
    let cfg = load(
        r#"
api:
  token_env: "DK_SENTINEL_INGEST_TOKEN_MISSING_A1"
"#,
    );
    let msg = resolve_api_token(&cfg, ConfigMode::Ingest)
        .unwrap_err()
        .to_string();
    assert!(msg.contains("SECRETS_MISSING"), "got: {msg}");
    assert!(msg.contains("mode=INGEST"), "got: {msg}");
    assert!(msg.contains("DK_SENTINEL_INGEST_TOKEN_MISSING_A1"), "got: {msg}");
}

#[test]
fn reconcile_reads_the_feed_token_name() {
    let cfg = load(
        r#"
api:
  token_env: "DK_SENTINEL_NOT_THIS_ONE_B2"
feed:
  token_env: "DK_SENTINEL_FEED_TOKEN_MISSING_B2"
"#,
    );
    let msg = resolve_api_token(&cfg, ConfigMode::Reconcile)
        .unwrap_err()
        .to_string();
    assert!(msg.contains("DK_SENTINEL_FEED_TOKEN_MISSING_B2"), "got: {msg}");
    assert!(!msg.contains("DK_SENTINEL_NOT_THIS_ONE_B2"), "got: {msg}");
}

#[test]
fn report_needs_no_token() {
    let cfg = load("{}");
    assert!(resolve_api_token(&cfg, ConfigMode::Report).unwrap().is_none());
}

#[test]
fn resolved_token_is_redacted_in_debug() {
    let var = "DK_SENTINEL_TOKEN_PRESENT_C3";
    std::env::set_var(var, "super-secret-token-value");
    let cfg = load(
        r#"
api:
  token_env: "DK_SENTINEL_TOKEN_PRESENT_C3"
"#,
    );
    let token = resolve_api_token(&cfg, ConfigMode::Ingest)
        .unwrap()
        .expect("ingest token resolved");
    assert_eq!(token.expose(), "super-secret-token-value");
    assert_eq!(token.var_name(), var);

    let dbg = format!("{token:?}");
    assert!(dbg.contains("<REDACTED>"));
    assert!(!dbg.contains("super-secret-token-value"));
    std::env::remove_var(var);
}
