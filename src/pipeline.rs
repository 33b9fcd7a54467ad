//! End-to-end run: config in, database file out.

use std::path::PathBuf;

use tracing::info;

use crate::config::LoadConfig;
use crate::db::SqliteDatabase;
use crate::error::LoadResult;
use crate::loader::{LoadReport, Loader, LoaderOptions};
use crate::source::TableSource;

/// Result of [`run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Database file that was written.
    pub database_path: PathBuf,
    /// Per-table outcome.
    pub report: LoadReport,
}

/// Parse every configured CSV file, then load them all into a fresh database file.
///
/// Every source is parsed before the database is touched, so an unreadable or empty file aborts
/// the run without creating anything.
pub fn run(config: &LoadConfig, options: LoaderOptions) -> LoadResult<RunSummary> {
    let paths = config.validate()?;
    let source_options = config.source_options();

    let sources = paths
        .iter()
        .map(|p| TableSource::from_path_with_options(p, &source_options))
        .collect::<LoadResult<Vec<_>>>()?;

    let database_path = config.database_path();
    info!(path = %database_path.display(), tables = sources.len(), "writing database");
    let mut db = SqliteDatabase::create(&database_path)?;
    let report = Loader::new(options).load(&sources, &mut db)?;

    Ok(RunSummary {
        database_path,
        report,
    })
}
