use chrono::NaiveDate;
use dk_diff::*;
use dk_schemas::{columns, Entity, NormalizedRow, SubmarketCode, Version};

fn snapshot(deck_month: u32, scale: f64, skip: Option<(SubmarketCode, u32)>) -> Vec<NormalizedRow> {
    let deck = NaiveDate::from_ymd_opt(2025, deck_month, 1).unwrap();
    let mut rows = Vec::new();
    for sm in SubmarketCode::ALL {
        for m in 1..=12u32 {
            if skip == Some((sm, m)) {
                continue;
            }
            let v = scale * (sm.code() as f64 * 100.0 + m as f64) + 0.1 * m as f64;
            rows.push(
                NormalizedRow::new(Entity::Sistema, Some(sm), 2025, m, deck, Version::Definitivo)
                    .with_metric(columns::GERACAO_EOL, v),
            );
        }
    }
    rows
}

fn caption(m: u32) -> SnapshotCaption {
    SnapshotCaption::new(NaiveDate::from_ymd_opt(2025, m, 1).unwrap(), Version::Definitivo)
}

#[test]
fn scenario_diff_against_itself_is_all_zero() {
    let a = snapshot(5, 1.0, None);
    let engine = SnapshotDiffEngine::new(columns::GERACAO_EOL, Axis::Submarket { year: 2025 });
    let report = engine.compare(&a, caption(5), &a, caption(5));

    // FC is never a row.
    assert_eq!(report.matrix.rows.len(), 4);
    let cells: Vec<_> = report.matrix.cells().collect();
    assert_eq!(cells.len(), 48);
    assert!(cells.iter().all(|c| c.delta == 0.0));
    assert!(report.matrix.rows.iter().all(|r| r.mean == Some(0.0)));
}

#[test]
fn scenario_diff_is_antisymmetric() {
    let a = snapshot(6, 1.3, Some((SubmarketCode::S, 4)));
    let b = snapshot(5, 0.9, Some((SubmarketCode::Ne, 9)));
    let axis = Axis::Year { submarket: Some(SubmarketCode::S) };

    let ab = diff(&pivot(&a, columns::GERACAO_EOL, axis), &pivot(&b, columns::GERACAO_EOL, axis));
    let ba = diff(&pivot(&b, columns::GERACAO_EOL, axis), &pivot(&a, columns::GERACAO_EOL, axis));

    for (x, y) in ab.rows.iter().zip(&ba.rows) {
        assert_eq!(x.label, y.label);
        for (p, q) in x.months.iter().zip(&y.months) {
            match (p, q) {
                (Some(p), Some(q)) => assert!((p + q).abs() < 1e-9),
                (None, None) => {}
                other => panic!("cell defined on one side only: {other:?}"),
            }
        }
    }
    // April for S is missing in `a`: undefined, never zero.
    let row = ab.row(RowLabel::Year(2025)).unwrap();
    assert_eq!(row.months[3], None);
}

#[test]
fn scenario_rendered_report_uses_portuguese_months_and_blanks() {
    let cur = snapshot(6, 1.0, Some((SubmarketCode::Se, 12)));
    let prior = snapshot(5, 1.0, None);
    let engine = SnapshotDiffEngine::new(columns::GERACAO_EOL, Axis::Year { submarket: None });
    let report = engine.compare(&cur, caption(6), &prior, caption(5));

    let table = report.render(0);
    assert_eq!(table.header[1..13], MONTH_LABELS.map(String::from));
    assert_eq!(table.header[13], MEAN_LABEL);
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0][0], "2025");
    // December lacks SE on the current side: the total is undefined and blank.
    assert!(table.rows[0][12].is_empty());
    assert!(!table.rows[0][11].is_empty());
    assert_eq!(report.matrix.rows[0].months[11], None);
    assert!(table.to_pipe_table().starts_with("vl_geracao_eol SIN: definitivo 01/06/2025"));
}

#[test]
fn scenario_total_with_a_submarket_missing_in_one_operand_is_blank() {
    let prior = snapshot(5, 1.0, None);
    let mut cur = prior.clone();
    cur.retain(|r| !(r.submarket == Some(SubmarketCode::Se) && r.month == 3));
    for r in &mut cur {
        r.deck_date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    }

    let engine = SnapshotDiffEngine::new(columns::GERACAO_EOL, Axis::Year { submarket: None });
    let report = engine.compare(&cur, caption(6), &prior, caption(5));
    let row = report.matrix.row(RowLabel::Year(2025)).unwrap();

    assert_eq!(row.months[2], None);
    assert!(row.months.iter().enumerate().all(|(i, d)| i == 2 || *d == Some(0.0)));
    assert_eq!(row.mean, Some(0.0));
}

#[test]
fn scenario_rows_of_older_deck_in_same_input_are_not_merged() {
    let row = |deck_month: u32, v: f64| {
        NormalizedRow::new(
            Entity::Sistema,
            Some(SubmarketCode::Se),
            2025,
            1,
            NaiveDate::from_ymd_opt(2025, deck_month, 1).unwrap(),
            Version::Definitivo,
        )
        .with_metric(columns::GERACAO_EOL, v)
    };
    // Append-only store: the current file still holds the April snapshot.
    let cur = vec![row(6, 1_000.0), row(4, 900.0)];
    let prior = vec![row(5, 1_000.0)];

    let cur_caption = SnapshotCaption::from_rows(&cur).unwrap();
    assert_eq!(cur_caption, caption(6));

    let engine = SnapshotDiffEngine::new(columns::GERACAO_EOL, Axis::Submarket { year: 2025 });
    let report = engine.compare(&cur, cur_caption, &prior, caption(5));
    let se = report.matrix.row(RowLabel::Submarket(SubmarketCode::Se)).unwrap();
    assert_eq!(se.months[0], Some(0.0));
    assert_eq!(report.current.deck_date, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
}

#[test]
fn scenario_caption_matches_only_its_own_tags() {
    let c = caption(6);
    let same = NormalizedRow::new(
        Entity::Sistema,
        Some(SubmarketCode::N),
        2025,
        1,
        c.deck_date,
        Version::Definitivo,
    );
    let mut other_version = same.clone();
    other_version.version = Version::Preliminar;
    assert!(c.matches(&same));
    assert!(!c.matches(&other_version));
}
