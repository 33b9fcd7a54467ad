use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use super::{RowFailure, TableReport};
use crate::error::LoadError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadSeverity {
    /// Informational event.
    Info,
    /// A row was not loaded; the run continues.
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// The run was aborted.
    Critical,
}

/// Which table an event is about.
#[derive(Debug, Clone)]
pub struct LoadContext {
    /// Table name.
    pub table: String,
    /// CSV file the table was built from, if any.
    pub path: Option<PathBuf>,
}

/// A failure reported to observers.
#[derive(Debug, Clone, Copy)]
pub enum LoadFailure<'a> {
    /// A row insert failed; the rest of the table's rows were abandoned.
    Row(&'a RowFailure),
    /// The run is aborting.
    Fatal(&'a LoadError),
}

impl fmt::Display for LoadFailure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row(failure) => write!(
                f,
                "row {} failed: {} (statement: {})",
                failure.row_index, failure.message, failure.statement
            ),
            Self::Fatal(err) => write!(f, "{err}"),
        }
    }
}

/// Observer interface for load progress.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait LoadObserver: Send + Sync {
    /// Called after a table's `CREATE TABLE` succeeded.
    fn on_table_created(&self, _ctx: &LoadContext) {}

    /// Called after a table's rows were committed (fully or partially).
    fn on_table_committed(&self, _ctx: &LoadContext, _report: &TableReport) {}

    /// Called when a row or the run fails.
    fn on_failure(&self, _ctx: &LoadContext, _severity: LoadSeverity, _failure: LoadFailure<'_>) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, failure: LoadFailure<'_>) {
        self.on_failure(ctx, severity, failure)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn LoadObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn LoadObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl LoadObserver for CompositeObserver {
    fn on_table_created(&self, ctx: &LoadContext) {
        for o in &self.observers {
            o.on_table_created(ctx);
        }
    }

    fn on_table_committed(&self, ctx: &LoadContext, report: &TableReport) {
        for o in &self.observers {
            o.on_table_committed(ctx, report);
        }
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, failure: LoadFailure<'_>) {
        for o in &self.observers {
            o.on_failure(ctx, severity, failure);
        }
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, failure: LoadFailure<'_>) {
        for o in &self.observers {
            o.on_alert(ctx, severity, failure);
        }
    }
}

/// Appends load events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl LoadObserver for FileObserver {
    fn on_table_created(&self, ctx: &LoadContext) {
        self.append_line(&format!("{} created table={}", unix_ts(), ctx.table));
    }

    fn on_table_committed(&self, ctx: &LoadContext, report: &TableReport) {
        self.append_line(&format!(
            "{} committed table={} rows={} complete={}",
            unix_ts(),
            ctx.table,
            report.rows_inserted,
            report.is_complete()
        ));
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, failure: LoadFailure<'_>) {
        self.append_line(&format!(
            "{} fail severity={:?} table={} err={}",
            unix_ts(),
            severity,
            ctx.table,
            failure
        ));
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, failure: LoadFailure<'_>) {
        self.append_line(&format!(
            "{} ALERT severity={:?} table={} err={}",
            unix_ts(),
            severity,
            ctx.table,
            failure
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
