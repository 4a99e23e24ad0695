use std::fs::File;
use std::io::{BufReader, Write};

use dk_vazoes::*;

fn write_records(path: &std::path::Path, records: usize, trailing: usize) {
    let mut f = File::create(path).unwrap();
    for k in 0..records {
        for s in 0..STATION_COUNT {
            let v = (k * 1000 + s) as i32;
            f.write_all(&v.to_le_bytes()).unwrap();
        }
    }
    f.write_all(&vec![0xAB; trailing]).unwrap();
}

#[test]
fn scenario_two_records_decode_to_jan_and_feb_1931() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vazoes.dat");
    write_records(&path, 2, 0);

    let obs = decode_all(BufReader::new(File::open(&path).unwrap())).unwrap();
    assert_eq!(obs.len(), 640);

    let first = obs[0];
    assert_eq!((first.station, first.year, first.month, first.value), (1, 1931, 1, 0));
    let last_jan = obs[319];
    assert_eq!((last_jan.station, last_jan.month), (320, 1));
    let first_feb = obs[320];
    assert_eq!(
        (first_feb.station, first_feb.year, first_feb.month, first_feb.value),
        (1, 1931, 2, 1000)
    );
}

#[test]
fn scenario_n_records_cover_n_consecutive_months() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vazoes.dat");
    write_records(&path, 25, 0);

    let obs = decode_all(File::open(&path).unwrap()).unwrap();
    assert_eq!(obs.len(), 25 * STATION_COUNT);

    for (k, chunk) in obs.chunks(STATION_COUNT).enumerate() {
        let m = EPOCH.offset(k);
        assert!(chunk.iter().all(|o| o.year == m.year && o.month == m.month));
        let stations: Vec<u16> = chunk.iter().map(|o| o.station).collect();
        assert_eq!(stations, (1..=320).collect::<Vec<u16>>());
    }
    assert_eq!((obs.last().unwrap().year, obs.last().unwrap().month), (1933, 1));
}

#[test]
fn scenario_trailing_partial_record_is_reported_not_emitted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vazoes.dat");
    write_records(&path, 3, 100);

    // Lazy path: complete records first, then exactly one truncation error.
    let items: Vec<_> = decode(File::open(&path).unwrap()).collect();
    assert_eq!(items.len(), 3 * STATION_COUNT + 1);
    assert!(items[..3 * STATION_COUNT].iter().all(|r| r.is_ok()));
    match items.last().unwrap() {
        Err(ArchiveError::Truncated(t)) => {
            assert_eq!(t.record_index, 3);
            assert_eq!(t.bytes_read, 100);
            assert_eq!(t.month, MonthCursor::new(1931, 4));
        }
        other => panic!("expected truncation, got {other:?}"),
    }

    // Strict path fails outright.
    let err = decode_all(File::open(&path).unwrap()).unwrap_err();
    assert!(err.is_truncated());

    // Lenient path keeps the leading records.
    let out = decode_lenient(File::open(&path).unwrap()).unwrap();
    assert_eq!(out.observations.len(), 3 * STATION_COUNT);
    assert!(!out.is_complete());
}

#[test]
fn scenario_reader_can_stop_early() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vazoes.dat");
    write_records(&path, 600, 0);

    let mut r = decode(File::open(&path).unwrap());
    let first_ten: Vec<_> = r.by_ref().take(10).map(|o| o.unwrap()).collect();
    assert_eq!(first_ten.len(), 10);
    assert_eq!(r.records_read(), 1);
}
