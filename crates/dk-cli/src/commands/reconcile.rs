//! `dk reconcile`: weekly feed -> monthly overrides -> SISTEMA rows.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use dk_api::{parse_weekly, ForecastFeed, HttpForecastFeed, WeeklyWeightedAverageRecord};
use dk_config::ConfigMode;
use dk_reconcile::{ForecastReconciler, OverrideSeries, ReconcilerConfig, WeeklyPoint};
use std::path::Path;
use uuid::Uuid;

use super::{read_json, read_rows, write_rows, CommandConfig};

pub async fn run(
    rows_path: &str,
    feed_file: Option<&str>,
    product_date: Option<NaiveDate>,
    config_paths: &[String],
    out: Option<&str>,
) -> Result<()> {
    let cfg = CommandConfig::load(config_paths, ConfigMode::Reconcile)?;
    let run_id = Uuid::new_v4();
    println!("run_id={run_id}");

    let rows = read_rows(rows_path)?;

    let points: Vec<WeeklyPoint> = match (feed_file, product_date) {
        (Some(path), _) => {
            let records: Vec<WeeklyWeightedAverageRecord> = read_json(path)?;
            parse_weekly(&records).with_context(|| format!("feed file rejected: {path}"))?
        }
        (None, Some(date)) => {
            let token = dk_config::secrets::resolve_api_token(&cfg.json(), ConfigMode::Reconcile)?
                .context("reconcile mode always resolves a token")?;
            let feed = HttpForecastFeed::new_with_base_url(
                token.expose().to_string(),
                cfg.engine.feed.base_url.clone(),
                cfg.engine.feed.path.clone(),
            );
            println!("feed_source={} product_date={date}", feed.source_name());
            // An unreachable feed aborts the run; rows are never reconciled
            // against a partial series.
            feed.fetch_weekly(date).await?
        }
        (None, None) => anyhow::bail!("provide --feed-file or --product-date"),
    };

    let series = OverrideSeries::from_weekly(&points);
    println!("weekly_points={} monthly_overrides={}", points.len(), series.len());

    let reconciler = ForecastReconciler::new(ReconcilerConfig {
        target_column: cfg.engine.reconcile.target_column.clone(),
    });
    let outcome = reconciler.reconcile(&rows, &series);
    let r = &outcome.report;

    println!("target_column={}", reconciler.target_column());
    println!(
        "overridden={} retained={} passed_through={} changed={} unused_overrides={}",
        r.overridden,
        r.retained,
        r.passed_through,
        r.changed_values(),
        r.unused.len()
    );

    if let Some(out) = out {
        write_rows(Path::new(out), &outcome.rows)?;
    }
    Ok(())
}
