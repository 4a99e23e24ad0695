use chrono::NaiveDate;
use dk_deck::*;
use dk_schemas::{columns, Version};

#[test]
fn scenario_year_9999_rows_are_excluded_entirely() {
    let loads = vec![
        CadicLoadRecord { year: 2025, month: 6, category: "ANDE".into(), value: Some(210.0) },
        CadicLoadRecord { year: 9999, month: 1, category: "ANDE".into(), value: Some(1.0) },
        CadicLoadRecord { year: 9999, month: 2, category: "BOA VISTA".into(), value: Some(2.0) },
    ];
    let tag = SnapshotTag::new(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(), Version::Definitivo);
    let rows = normalize_cadic(&loads, tag).unwrap();

    assert_eq!(rows.len(), 1);
    assert!(rows.iter().all(|r| r.year < 9999));
    assert_eq!(rows[0].metric(columns::ANDE), Some(210.0));
}
