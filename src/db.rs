//! Database handle used by the loader.
//!
//! The loader needs two things from a database: run a statement for its side effect, and commit
//! the current transaction. It also asks whether a transaction is still open after a failed
//! statement. [`Database`] is that seam; [`SqliteDatabase`] is the implementation backed by a
//! SQLite file.

use std::fs;
use std::path::Path;

use rusqlite::{Connection, params_from_iter};
use tracing::debug;

use crate::error::DatabaseError;
use crate::types::Value;

/// Minimal database interface required by [`crate::loader::Loader`].
pub trait Database {
    /// Execute one statement, binding `params` to its placeholders in order.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<(), DatabaseError>;

    /// Commit the current transaction. A no-op when nothing is pending.
    fn commit(&mut self) -> Result<(), DatabaseError>;

    /// Whether uncommitted work is still pending.
    ///
    /// Some errors (`SQLITE_FULL`, `SQLITE_IOERR`, ...) make SQLite roll back the whole
    /// transaction; after those this returns `false` and earlier statements are gone.
    fn in_transaction(&self) -> bool {
        true
    }
}

/// A SQLite database file.
///
/// A transaction is opened by the first [`Database::execute`] after a commit and stays open until
/// the next [`Database::commit`].
#[derive(Debug)]
pub struct SqliteDatabase {
    conn: Connection,
}

impl SqliteDatabase {
    /// Create a fresh database at `path`, replacing any existing file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        match fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "replaced existing database file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(DatabaseError::Backend(format!(
                    "cannot replace {}: {e}",
                    path.display()
                )));
            }
        }
        Self::open(path)
    }

    /// Open (or create) the database at `path`, keeping existing contents.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// The underlying connection, for reading back results.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Database for SqliteDatabase {
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<(), DatabaseError> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }
        let mut stmt = self.conn.prepare_cached(sql)?;
        stmt.execute(params_from_iter(params.iter()))?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), DatabaseError> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }
}
