use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use csv_to_db::config::LoadConfig;
use csv_to_db::loader::{FileObserver, LoadObserver, LoadSeverity, LoaderOptions};
use csv_to_db::pipeline;
use csv_to_db::source::RowWidthPolicy;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

/// Load CSV files into a SQLite database, one table per file.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// CSV files or glob patterns. Added after any from --config / --paths-file.
    csv: Vec<PathBuf>,

    /// JSON config file.
    #[arg(long, conflicts_with = "paths_file")]
    config: Option<PathBuf>,

    /// Paths file: one CSV path, output directory or database name per line.
    #[arg(long)]
    paths_file: Option<PathBuf>,

    /// Directory for the database file.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Database name (without `.db`).
    #[arg(long)]
    name: Option<String>,

    /// Pad short rows with NULL and truncate long rows instead of rejecting them.
    #[arg(long)]
    pad_rows: bool,

    /// Append load events to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    info!(
        sources = config.sources.len(),
        database = %config.database_path().display(),
        "configuration"
    );

    let options = LoaderOptions {
        observer: args
            .log_file
            .as_ref()
            .map(|p| -> Arc<dyn LoadObserver> { Arc::new(FileObserver::new(p)) }),
        alert_at_or_above: LoadSeverity::Critical,
    };

    let summary = pipeline::run(&config, options).context("load failed")?;
    for table in &summary.report.tables {
        match &table.failure {
            None => println!("{}: {} rows", table.table, table.rows_inserted),
            Some(f) => println!(
                "{}: {} of {} rows (stopped at row {}: {})",
                table.table, table.rows_inserted, table.rows_total, f.row_index, f.message
            ),
        }
    }
    println!("wrote {}", summary.database_path.display());
    Ok(())
}

fn build_config(args: &Args) -> Result<LoadConfig> {
    let mut config = match (&args.config, &args.paths_file) {
        (Some(path), _) => LoadConfig::from_json_path(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        (None, Some(path)) => LoadConfig::from_paths_file(path)
            .with_context(|| format!("reading paths file {}", path.display()))?,
        (None, None) => LoadConfig::default(),
    };

    config.sources.extend(args.csv.iter().cloned());
    if let Some(dir) = &args.out_dir {
        config.output_dir = dir.clone();
    }
    if let Some(name) = &args.name {
        config.database_name = name.clone();
    }
    if args.pad_rows {
        config.row_width_policy = RowWidthPolicy::PadOrTruncate;
    }
    Ok(config)
}
