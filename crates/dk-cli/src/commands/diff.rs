//! `dk diff`: render `current - prior` for one metric.

use anyhow::{Context, Result};
use dk_config::ConfigMode;
use dk_diff::{Axis, SnapshotCaption, SnapshotDiffEngine};
use dk_schemas::SubmarketCode;

use super::{read_rows, CommandConfig};

pub struct DiffArgs<'a> {
    pub current: &'a str,
    pub prior: &'a str,
    pub metric: &'a str,
    /// `Some` selects the submarket axis; `None` means `--by-year`.
    pub year: Option<i32>,
    pub submarket: Option<&'a str>,
    pub decimals: Option<usize>,
    pub config_paths: &'a [String],
}

pub fn run(args: DiffArgs<'_>) -> Result<()> {
    let cfg = CommandConfig::load(args.config_paths, ConfigMode::Report)?;
    let decimals = args.decimals.unwrap_or(cfg.engine.diff.decimals);

    let axis = match args.year {
        Some(year) => Axis::Submarket { year },
        None => {
            let submarket = args
                .submarket
                .map(SubmarketCode::from_mnemonic)
                .transpose()
                .context("invalid --submarket")?;
            Axis::Year { submarket }
        }
    };

    let current = read_rows(args.current)?;
    let prior = read_rows(args.prior)?;
    let current_caption = SnapshotCaption::from_rows(&current)
        .with_context(|| format!("no rows in {}", args.current))?;
    let prior_caption = SnapshotCaption::from_rows(&prior)
        .with_context(|| format!("no rows in {}", args.prior))?;

    let report = SnapshotDiffEngine::new(args.metric, axis).compare(
        &current,
        current_caption,
        &prior,
        prior_caption,
    );

    println!("metric={}", report.metric);
    println!(
        "diff_rows={} defined_cells={}",
        report.matrix.rows.len(),
        report.matrix.cells().count()
    );
    print!("{}", report.render(decimals).to_pipe_table());
    Ok(())
}
