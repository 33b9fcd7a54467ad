use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Error returned by a [`crate::db::Database`] handle.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Error reported by SQLite.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Error reported by a non-SQLite backend.
    #[error("{0}")]
    Backend(String),
}

/// Error type returned by source construction, configuration and loading.
///
/// A single enum shared across the crate. Row insertion failures are deliberately absent: they
/// are recoverable and reported through [`crate::loader::LoadReport`] instead.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV tokenizer error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The file has no header row.
    #[error("empty file (no header row): {}", path.display())]
    EmptyFile { path: PathBuf },

    /// A table or column name cannot be used as an SQL identifier.
    #[error("invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    /// The run configuration is unusable (e.g. no CSV inputs).
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Creating a table failed, or its name collides with a table created earlier in the run.
    #[error("schema conflict for table '{table}': {message}")]
    SchemaConflict { table: String, message: String },

    /// Opening or committing the database failed.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

impl LoadError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_identifier(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}
