//! `dk deck normalize` / `dk deck load-update`.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use dk_config::ConfigMode;
use dk_deck::{
    build_quality_report, merge_quadrimestral, normalize_cadic, normalize_patamar,
    normalize_sistema, prepare_load_update, resolve_load_revision_version, DeckDecoder,
    JsonDeckDecoder, MonthlyLoadForecastRecord, SnapshotTag,
};
use dk_schemas::{NormalizedRow, Version};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{publish, read_json, read_rows, write_rows, CommandConfig};
use crate::EntityArg;

// ---------------------------------------------------------------------------
// normalize
// ---------------------------------------------------------------------------

pub struct NormalizeArgs<'a> {
    pub entity: EntityArg,
    pub tables: &'a str,
    pub filename: &'a str,
    pub deck_date: NaiveDate,
    pub out: Option<&'a str>,
    pub publish: bool,
    pub config_paths: &'a [String],
}

pub async fn normalize(args: NormalizeArgs<'_>) -> Result<()> {
    let cfg = CommandConfig::load(args.config_paths, ConfigMode::Ingest)?;
    let run_id = Uuid::new_v4();
    println!("run_id={run_id}");

    // Version first: an unrecognized filename aborts before any table is read.
    let tag = SnapshotTag::from_deck_filename(args.filename, args.deck_date)?;
    let path = Path::new(args.tables);
    let decoder = JsonDeckDecoder::new();

    let rows: Vec<NormalizedRow> = match args.entity {
        EntityArg::Sistema => {
            let t = decoder.sistema(path)?;
            normalize_sistema(&t.market_energy, &t.unsimulated_generation, tag)?
        }
        EntityArg::Cadic => {
            let t = decoder.cadic(path)?;
            normalize_cadic(&t.cadic_loads, tag)?
        }
        EntityArg::Patamar => {
            let t = decoder.patamar(path)?;
            let out = normalize_patamar(&t, tag)?;
            println!("load_rows={} exchange_rows={}", out.load.len(), out.exchange.len());
            out.load.into_iter().chain(out.exchange).collect()
        }
    };

    println!(
        "entity={} version={} deck_date={} rows={}",
        args.entity.as_str(),
        tag.version, tag.deck_date, rows.len()
    );
    print_quality(&rows);

    if let Some(out) = args.out {
        write_rows(Path::new(out), &rows)?;
    }
    if args.publish {
        publish(&cfg, &rows).await?;
    }
    Ok(())
}

fn print_quality(rows: &[NormalizedRow]) {
    let report = build_quality_report(rows);
    debug!("{report}");
    if !report.is_clean() {
        warn!(
            duplicates = report.duplicates.len(),
            gaps = report.gaps.len(),
            "snapshot quality issues"
        );
    }
    println!(
        "quality_clean={} duplicates={} gaps={}",
        report.is_clean(),
        report.duplicates.len(),
        report.gaps.len()
    );
}

// ---------------------------------------------------------------------------
// load-update
// ---------------------------------------------------------------------------

pub struct LoadUpdateArgs<'a> {
    pub forecast: &'a str,
    pub filename: &'a str,
    pub deck_date: NaiveDate,
    pub last_sistema: Option<&'a str>,
    pub last_cadic: Option<&'a str>,
    pub out_dir: Option<&'a str>,
    pub publish: bool,
    pub config_paths: &'a [String],
}

pub async fn load_update(args: LoadUpdateArgs<'_>) -> Result<()> {
    let cfg = CommandConfig::load(args.config_paths, ConfigMode::Ingest)?;
    let run_id = Uuid::new_v4();
    println!("run_id={run_id}");

    let version = resolve_load_revision_version(args.filename);
    let records: Vec<MonthlyLoadForecastRecord> = read_json(args.forecast)?;
    let update = prepare_load_update(&records, args.deck_date, version)?;

    let update = match (version, args.last_sistema, args.last_cadic) {
        (Version::Quadrimestral, Some(ls), Some(lc)) => {
            let last_sistema = read_rows(ls)?;
            let last_cadic = read_rows(lc)?;
            merge_quadrimestral(&last_sistema, &last_cadic, &update)?
        }
        (Version::Quadrimestral, _, _) => anyhow::bail!(
            "quadrimestral revision '{}' needs --last-sistema and --last-cadic",
            args.filename
        ),
        (_, Some(_), _) | (_, _, Some(_)) => {
            warn!(filename = args.filename, "not a quadrimestral revision; last deck ignored");
            update
        }
        _ => update,
    };

    println!(
        "version={} deck_date={} sistema_rows={} cadic_rows={}",
        update.version,
        update.deck_date,
        update.sistema.len(),
        update.cadic.len()
    );

    if let Some(dir) = args.out_dir {
        let dir = PathBuf::from(dir);
        write_rows(&dir.join("sistema.json"), &update.sistema)
            .context("write sistema update failed")?;
        write_rows(&dir.join("cadic.json"), &update.cadic).context("write cadic update failed")?;
    }
    if args.publish {
        let mut rows = update.sistema;
        rows.extend(update.cadic);
        publish(&cfg, &rows).await?;
    }
    Ok(())
}
