//! Turning [`TableSource`]s into database tables.
//!
//! [`Loader::load`] processes sources strictly in order. For each one it:
//!
//! - creates the table (any failure here aborts the whole run)
//! - inserts the rows in order, stopping at the first row that fails
//! - commits whatever was inserted
//!
//! A failed row is logged and recorded in the returned [`LoadReport`]; rows already inserted for
//! that table are kept and later tables are still loaded. If the database rolled back the table's
//! transaction on that failure, the table reports zero inserted rows. There is no retry and no
//! transaction spanning more than one table.

pub mod observability;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::db::Database;
use crate::error::{LoadError, LoadResult};
use crate::source::TableSource;

pub use observability::{CompositeObserver, FileObserver, LoadContext, LoadFailure, LoadObserver, LoadSeverity};

/// The first row of a table that could not be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    /// Zero-based row index (the row's would-be `id`).
    pub row_index: usize,
    /// The failing statement with its values interpolated.
    pub statement: String,
    /// Database error message.
    pub message: String,
}

/// Outcome of loading one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    /// Table name.
    pub table: String,
    /// Rows available in the source.
    pub rows_total: usize,
    /// Rows inserted and committed.
    pub rows_inserted: usize,
    /// Set when loading stopped early.
    pub failure: Option<RowFailure>,
}

impl TableReport {
    /// Whether every row of the source was inserted.
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Outcome of a whole run, one entry per table in load order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub tables: Vec<TableReport>,
}

impl LoadReport {
    /// Total rows inserted across all tables.
    pub fn rows_inserted(&self) -> usize {
        self.tables.iter().map(|t| t.rows_inserted).sum()
    }

    /// Tables that stopped early.
    pub fn incomplete(&self) -> impl Iterator<Item = &TableReport> {
        self.tables.iter().filter(|t| !t.is_complete())
    }

    /// Whether every row of every table was inserted.
    pub fn is_complete(&self) -> bool {
        self.tables.iter().all(TableReport::is_complete)
    }

    /// Look up a table's report by name.
    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|t| t.table == name)
    }
}

/// Options controlling [`Loader`] behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct LoaderOptions {
    /// Optional observer for progress and failures.
    pub observer: Option<Arc<dyn LoadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: LoadSeverity,
}

impl fmt::Debug for LoaderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
        }
    }
}

/// Loads [`TableSource`]s into a [`Database`], one committed table at a time.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    options: LoaderOptions,
}

impl Loader {
    /// Create a loader with the given options.
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Load every source into `db`, in order.
    ///
    /// Returns an error only for fatal failures: a table that cannot be created (including a name
    /// already loaded earlier in this run) or a commit that fails. Row failures are recorded in
    /// the report.
    pub fn load<'a, D, I>(&self, sources: I, db: &mut D) -> LoadResult<LoadReport>
    where
        D: Database + ?Sized,
        I: IntoIterator<Item = &'a TableSource>,
    {
        let mut report = LoadReport::default();
        let mut created: HashSet<String> = HashSet::new();

        for source in sources {
            let ctx = LoadContext {
                table: source.name().to_owned(),
                path: source.path().map(|p| p.to_path_buf()),
            };

            // SQLite table names are case-insensitive.
            if !created.insert(source.name().to_lowercase()) {
                let err = LoadError::SchemaConflict {
                    table: ctx.table.clone(),
                    message: "a table with this name was already loaded in this run".to_string(),
                };
                return Err(self.fatal(&ctx, err));
            }

            if let Err(e) = db.execute(source.create_statement(), &[]) {
                let err = LoadError::SchemaConflict {
                    table: ctx.table.clone(),
                    message: e.to_string(),
                };
                return Err(self.fatal(&ctx, err));
            }
            debug!(table = %ctx.table, sql = source.create_statement(), "created table");
            if let Some(obs) = self.options.observer.as_ref() {
                obs.on_table_created(&ctx);
            }

            let table = self.insert_rows(source, db, &ctx);

            if let Err(e) = db.commit() {
                return Err(self.fatal(&ctx, LoadError::Database(e)));
            }
            info!(
                table = %table.table,
                rows = table.rows_inserted,
                total = table.rows_total,
                "committed table"
            );
            if let Some(obs) = self.options.observer.as_ref() {
                obs.on_table_committed(&ctx, &table);
            }
            report.tables.push(table);
        }

        Ok(report)
    }

    fn insert_rows<D>(&self, source: &TableSource, db: &mut D, ctx: &LoadContext) -> TableReport
    where
        D: Database + ?Sized,
    {
        let mut rows_inserted = 0;
        let mut failure = None;
        for stmt in source.insert_statements() {
            if let Err(e) = db.execute(stmt.sql(), &stmt.params()) {
                let row = RowFailure {
                    row_index: stmt.row_index,
                    statement: stmt.to_string(),
                    message: e.to_string(),
                };
                warn!(
                    table = %ctx.table,
                    row = row.row_index,
                    statement = %row.statement,
                    cause = %row.message,
                    "row insert failed; abandoning remaining rows of this table"
                );
                self.notify(ctx, LoadSeverity::Warning, LoadFailure::Row(&row));
                if !db.in_transaction() {
                    warn!(
                        table = %ctx.table,
                        rows_lost = rows_inserted,
                        "database rolled back the transaction; no rows of this table will be committed"
                    );
                    rows_inserted = 0;
                }
                failure = Some(row);
                break;
            }
            rows_inserted += 1;
        }

        TableReport {
            table: ctx.table.clone(),
            rows_total: source.row_count(),
            rows_inserted,
            failure,
        }
    }

    fn fatal(&self, ctx: &LoadContext, err: LoadError) -> LoadError {
        error!(table = %ctx.table, err = %err, "load aborted");
        self.notify(ctx, LoadSeverity::Critical, LoadFailure::Fatal(&err));
        err
    }

    fn notify(&self, ctx: &LoadContext, severity: LoadSeverity, failure: LoadFailure<'_>) {
        if let Some(obs) = self.options.observer.as_ref() {
            obs.on_failure(ctx, severity, failure);
            if severity >= self.options.alert_at_or_above {
                obs.on_alert(ctx, severity, failure);
            }
        }
    }
}

/// Load `sources` into `db` with default options.
pub fn load<'a, D, I>(sources: I, db: &mut D) -> LoadResult<LoadReport>
where
    D: Database + ?Sized,
    I: IntoIterator<Item = &'a TableSource>,
{
    Loader::default().load(sources, db)
}
