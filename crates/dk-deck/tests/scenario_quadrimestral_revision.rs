use chrono::NaiveDate;
use dk_deck::*;
use dk_schemas::{columns, Entity, NormalizedRow, SubmarketCode, Version};

fn d(y: i32, m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, 1).unwrap()
}

fn forecast(region: &str, m: u32) -> MonthlyLoadForecastRecord {
    MonthlyLoadForecastRecord {
        date: d(2025, m),
        source: region.to_string(),
        load_type: "MEDIUM".to_string(),
        load_net_mmgd: 10_000.9,
        exp_cgh: Some(1.0),
        exp_eol: Some(2.0),
        exp_ufv: Some(3.0),
        exp_ute: Some(4.0),
        base_mmgd: Some(500.0),
    }
}

#[test]
fn scenario_quad_filename_merges_onto_last_deck() {
    let filename = "CargaMensal_2revquad2529.zip";
    let version = resolve_load_revision_version(filename);
    assert_eq!(version, Version::Quadrimestral);

    let update = prepare_load_update(&[forecast("NORDESTE", 10)], d(2025, 9), version).unwrap();

    let last_sistema: Vec<NormalizedRow> = [10, 11]
        .into_iter()
        .map(|m| {
            NormalizedRow::new(Entity::Sistema, Some(SubmarketCode::Ne), 2025, m, d(2025, 8), Version::Definitivo)
                .with_metric(columns::GERACAO_EOL, 4_000.0)
        })
        .collect();

    let merged = merge_quadrimestral(&last_sistema, &[], &update).unwrap();
    assert_eq!(merged.sistema.len(), 2);
    assert!(merged
        .sistema
        .iter()
        .all(|r| r.version == Version::Quadrimestral && r.deck_date == d(2025, 9)));
    assert_eq!(merged.sistema[0].metric(columns::ENERGIA_TOTAL), Some(10_000.0));
    assert_eq!(merged.sistema[1].metric(columns::ENERGIA_TOTAL), None);
    assert_eq!(merged.sistema[1].metric(columns::GERACAO_EOL), Some(4_000.0));
}
