//! Config hash stability.
//!
//! GREEN when:
//! - the same layers hash identically across calls
//! - key order inside a document does not change the hash
//! - different values produce different hashes
//! - later layers override earlier ones before hashing
//! - file-backed loading matches string loading

use dk_config::{load_layered_yaml, load_layered_yaml_from_strings};
use std::io::Write;

const BASE_YAML: &str = r#"
api:
  base_url: "http://localhost:8000/api/v2"
  token_env: "DK_API_TOKEN"
feed:
  path: "decks/weol/weighted-average/week"
diff:
  decimals: 0
"#;

const BASE_YAML_REORDERED: &str = r#"
diff:
  decimals: 0
feed:
  path: "decks/weol/weighted-average/week"
api:
  token_env: "DK_API_TOKEN"
  base_url: "http://localhost:8000/api/v2"
"#;

const OVERLAY_YAML: &str = r#"
diff:
  decimals: 2
reconcile:
  target_column: "vl_geracao_ufv"
"#;

#[test]
fn same_input_produces_identical_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.canonical_json, b.canonical_json);
}

#[test]
fn reordered_keys_produce_same_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();
    assert_eq!(
        a.config_hash, b.config_hash,
        "reordering keys in YAML must not change the hash"
    );
}

#[test]
fn different_values_produce_different_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_ne!(a.config_hash, b.config_hash);
}

#[test]
fn overlay_wins_and_untouched_keys_survive() {
    let c = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_eq!(
        c.config_json.pointer("/diff/decimals").and_then(|v| v.as_u64()),
        Some(2)
    );
    assert_eq!(
        c.config_json.pointer("/api/token_env").and_then(|v| v.as_str()),
        Some("DK_API_TOKEN")
    );
    assert_eq!(
        c.config_json
            .pointer("/reconcile/target_column")
            .and_then(|v| v.as_str()),
        Some("vl_geracao_ufv")
    );
}

#[test]
fn hash_is_64_hex_chars() {
    let c = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(c.config_hash.len(), 64);
    assert!(c.config_hash.chars().all(|ch| ch.is_ascii_hexdigit()));
}

#[test]
fn file_layers_match_string_layers() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.yaml");
    let overlay = dir.path().join("overlay.yaml");
    std::fs::File::create(&base)
        .unwrap()
        .write_all(BASE_YAML.as_bytes())
        .unwrap();
    std::fs::File::create(&overlay)
        .unwrap()
        .write_all(OVERLAY_YAML.as_bytes())
        .unwrap();

    let base_s = base.to_str().unwrap();
    let overlay_s = overlay.to_str().unwrap();
    let from_files = load_layered_yaml(&[base_s, overlay_s]).unwrap();
    let from_strings = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_eq!(from_files.config_hash, from_strings.config_hash);
}

#[test]
fn missing_file_names_the_path() {
    let err = load_layered_yaml(&["/definitely/not/here/dk.yaml"]).unwrap_err();
    assert!(format!("{err:#}").contains("/definitely/not/here/dk.yaml"));
}
