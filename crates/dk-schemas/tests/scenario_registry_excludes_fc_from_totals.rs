//! Any aggregate representing total system load or generation must be
//! computed over the load-bearing submarkets only.

use dk_schemas::SubmarketCode;

#[test]
fn load_bearing_set_is_all_codes_minus_fc() {
    let all: Vec<SubmarketCode> = SubmarketCode::ALL
        .into_iter()
        .filter(|s| s.is_load_bearing())
        .collect();
    assert_eq!(all, SubmarketCode::LOAD_BEARING.to_vec());
    assert!(!all.contains(&SubmarketCode::Fc));
}

#[test]
fn every_code_has_a_mnemonic_and_back() {
    let mnemonics: Vec<&str> = SubmarketCode::ALL.iter().map(|s| s.mnemonic()).collect();
    assert_eq!(mnemonics, vec!["SE", "S", "NE", "N", "FC"]);
    let codes: Vec<i64> = SubmarketCode::ALL.iter().map(|s| s.code()).collect();
    assert_eq!(codes, vec![1, 2, 3, 4, 11]);
}
