use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(name = "dk")]
#[command(about = "Deck time-series reconciliation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> environment -> local overrides)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Historical inflow archive utilities
    Vazoes {
        #[command(subcommand)]
        cmd: VazoesCmd,
    },

    /// Deck snapshot normalization
    Deck {
        #[command(subcommand)]
        cmd: DeckCmd,
    },

    /// Apply the wind-generation forecast override to SISTEMA rows
    Reconcile {
        /// Normalized SISTEMA rows (JSON array)
        #[arg(long)]
        rows: String,

        /// Weekly weighted-average records already on disk (JSON array)
        #[arg(long = "feed-file", conflicts_with = "product_date")]
        feed_file: Option<String>,

        /// Fetch the feed for this product date (YYYY-MM-DD)
        #[arg(long = "product-date", required_unless_present = "feed_file")]
        product_date: Option<NaiveDate>,

        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Write reconciled rows here
        #[arg(long)]
        out: Option<String>,
    },

    /// Month-by-month difference between two snapshots of one metric
    Diff {
        /// Newer snapshot rows (JSON array). Reconcile SISTEMA rows first.
        #[arg(long)]
        current: String,

        /// Older snapshot rows (JSON array)
        #[arg(long)]
        prior: String,

        /// Metric column, e.g. vl_geracao_eol
        #[arg(long)]
        metric: String,

        /// One row per submarket for this year
        #[arg(long, conflicts_with = "by_year", required_unless_present = "by_year")]
        year: Option<i32>,

        /// One row per year
        #[arg(long = "by-year", default_value_t = false)]
        by_year: bool,

        /// With --by-year: restrict to one submarket (default: system total)
        #[arg(long, requires = "by_year")]
        submarket: Option<String>,

        /// Fixed decimal places (default from config, else 0)
        #[arg(long)]
        decimals: Option<usize>,

        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,
    },
}

#[derive(Subcommand)]
enum VazoesCmd {
    /// Decode a binary archive and print its span
    Decode {
        #[arg(long)]
        path: String,

        /// Export observations as CSV (station,year,month,value)
        #[arg(long)]
        csv: Option<String>,

        /// Fail on a truncated tail instead of keeping the complete records
        #[arg(long, default_value_t = false)]
        strict: bool,

        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,
    },

    /// Rebuild a binary archive from a CSV export
    Encode {
        #[arg(long)]
        csv: String,

        #[arg(long)]
        out: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum EntityArg {
    Sistema,
    Cadic,
    Patamar,
}

impl EntityArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityArg::Sistema => "SISTEMA",
            EntityArg::Cadic => "CADIC",
            EntityArg::Patamar => "PATAMAR",
        }
    }
}

#[derive(Subcommand)]
enum DeckCmd {
    /// Normalize one section of a decoded deck into canonical rows
    Normalize {
        #[arg(long, value_enum)]
        entity: EntityArg,

        /// Decoded tables (JSON object keyed by table name)
        #[arg(long)]
        tables: String,

        /// Original deck file name; carries the version token
        #[arg(long)]
        filename: String,

        #[arg(long = "deck-date")]
        deck_date: NaiveDate,

        /// Write normalized rows here
        #[arg(long)]
        out: Option<String>,

        /// Post rows to the persistence API, one call per table
        #[arg(long, default_value_t = false)]
        publish: bool,

        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,
    },

    /// Turn a monthly load forecast into SISTEMA / CADIC update rows
    LoadUpdate {
        /// Monthly load forecast records (JSON array)
        #[arg(long)]
        forecast: String,

        /// Product file name; `quad` marks the quadrimestral revision
        #[arg(long)]
        filename: String,

        #[arg(long = "deck-date")]
        deck_date: NaiveDate,

        /// Last definitive SISTEMA rows (required for a quadrimestral revision)
        #[arg(long = "last-sistema", requires = "last_cadic")]
        last_sistema: Option<String>,

        /// Last definitive CADIC rows (required for a quadrimestral revision)
        #[arg(long = "last-cadic", requires = "last_sistema")]
        last_cadic: Option<String>,

        /// Write sistema.json + cadic.json here
        #[arg(long = "out-dir")]
        out_dir: Option<String>,

        #[arg(long, default_value_t = false)]
        publish: bool,

        #[arg(long = "config")]
        config_paths: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = dk_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Vazoes { cmd } => match cmd {
            VazoesCmd::Decode {
                path,
                csv,
                strict,
                config_paths,
            } => commands::vazoes::decode(&path, csv.as_deref(), strict, &config_paths)?,
            VazoesCmd::Encode { csv, out } => commands::vazoes::encode(&csv, &out)?,
        },

        Commands::Deck { cmd } => match cmd {
            DeckCmd::Normalize {
                entity,
                tables,
                filename,
                deck_date,
                out,
                publish,
                config_paths,
            } => {
                commands::deck::normalize(commands::deck::NormalizeArgs {
                    entity,
                    tables: &tables,
                    filename: &filename,
                    deck_date,
                    out: out.as_deref(),
                    publish,
                    config_paths: &config_paths,
                })
                .await?
            }
            DeckCmd::LoadUpdate {
                forecast,
                filename,
                deck_date,
                last_sistema,
                last_cadic,
                out_dir,
                publish,
                config_paths,
            } => {
                commands::deck::load_update(commands::deck::LoadUpdateArgs {
                    forecast: &forecast,
                    filename: &filename,
                    deck_date,
                    last_sistema: last_sistema.as_deref(),
                    last_cadic: last_cadic.as_deref(),
                    out_dir: out_dir.as_deref(),
                    publish,
                    config_paths: &config_paths,
                })
                .await?
            }
        },

        Commands::Reconcile {
            rows,
            feed_file,
            product_date,
            config_paths,
            out,
        } => {
            commands::reconcile::run(
                &rows,
                feed_file.as_deref(),
                product_date,
                &config_paths,
                out.as_deref(),
            )
            .await?
        }

        Commands::Diff {
            current,
            prior,
            metric,
            year,
            by_year: _,
            submarket,
            decimals,
            config_paths,
        } => commands::diff::run(commands::diff::DiffArgs {
            current: &current,
            prior: &prior,
            metric: &metric,
            year,
            submarket: submarket.as_deref(),
            decimals,
            config_paths: &config_paths,
        })?,
    }

    Ok(())
}

fn init_tracing() {
    // Logs go to stderr; stdout carries the key=value summary.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
