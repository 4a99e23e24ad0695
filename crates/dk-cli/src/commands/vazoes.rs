//! `dk vazoes decode` / `dk vazoes encode`.

use anyhow::{Context, Result};
use dk_config::ConfigMode;
use dk_vazoes::{DecodeOutcome, Observation, EPOCH};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use super::CommandConfig;

pub fn decode(path: &str, csv_out: Option<&str>, strict: bool, config_paths: &[String]) -> Result<()> {
    let cfg = CommandConfig::load(config_paths, ConfigMode::Ingest)?;
    let strict = strict || cfg.engine.archive.strict;

    let file = File::open(path).with_context(|| format!("open archive failed: {path}"))?;
    let reader = BufReader::new(file);

    let outcome = if strict {
        let observations = dk_vazoes::decode_all(reader)
            .with_context(|| format!("strict decode failed: {path}"))?;
        let records = observations.len() / dk_vazoes::STATION_COUNT;
        DecodeOutcome {
            observations,
            records,
            truncated: None,
        }
    } else {
        dk_vazoes::decode_lenient(reader).with_context(|| format!("decode failed: {path}"))?
    };

    println!("records={}", outcome.records);
    println!("observations={}", outcome.observations.len());
    match outcome.span() {
        Some((first, last)) => println!("first_month={first} last_month={last}"),
        None => println!("first_month=none last_month=none"),
    }
    match &outcome.truncated {
        Some(t) => println!(
            "truncated=true truncated_record_index={} truncated_month={} bytes_read={}",
            t.record_index, t.month, t.bytes_read
        ),
        None => println!("truncated=false"),
    }

    if let Some(out) = csv_out {
        write_csv(out, &outcome.observations)?;
        println!("csv_path={out}");
    }
    Ok(())
}

fn write_csv(path: &str, observations: &[Observation]) -> Result<()> {
    let mut w = csv::Writer::from_path(path).with_context(|| format!("create csv failed: {path}"))?;
    for o in observations {
        w.serialize(o).context("csv write failed")?;
    }
    w.flush().context("csv flush failed")?;
    Ok(())
}

pub fn encode(csv_in: &str, out: &str) -> Result<()> {
    let mut r = csv::Reader::from_path(csv_in).with_context(|| format!("open csv failed: {csv_in}"))?;
    let observations: Vec<Observation> = r
        .deserialize()
        .collect::<Result<_, _>>()
        .with_context(|| format!("invalid csv row in {csv_in}"))?;

    let file = File::create(out).with_context(|| format!("create archive failed: {out}"))?;
    let mut writer = BufWriter::new(file);
    let records = dk_vazoes::encode(&observations, &mut writer)
        .with_context(|| format!("encode failed: {csv_in}"))?;
    writer.flush().context("archive flush failed")?;

    if records == 0 {
        println!("records=0 first_month=none last_month=none");
    } else {
        let last = EPOCH.offset(records - 1);
        println!("records={records} first_month={EPOCH} last_month={last}");
    }
    println!("archive_path={out}");
    Ok(())
}
