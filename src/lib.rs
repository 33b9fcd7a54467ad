//! `csv-to-db` loads CSV files into a single SQLite database, one table per file, inferring each
//! table's schema from the data.
//!
//! The pipeline has two halves:
//!
//! - [`source::TableSource`] parses one CSV file and infers a type for every column
//! - [`loader::Loader`] creates one table per source, inserts its rows and commits
//!
//! [`pipeline::run`] wires both to a [`config::LoadConfig`] and a fresh database file.
//!
//! ## Type inference
//!
//! Each column gets the tightest type that accepts **every** value in it:
//!
//! - [`types::ColumnType::Integer`]: every value is a base-10 integer (`-3`, `+7`, `42`)
//! - [`types::ColumnType::Real`]: every value is a floating point number (`4.5`, `1e3`, `5`)
//! - [`types::ColumnType::Text`]: anything else, including empty fields
//!
//! One value that does not fit is enough to loosen the whole column.
//!
//! ## Tables
//!
//! A file `people.csv` with header `name,age` becomes
//!
//! ```sql
//! CREATE TABLE "people" (id INTEGER PRIMARY KEY AUTOINCREMENT, "name" TEXT, "age" INTEGER)
//! ```
//!
//! where `id` is the zero-based position of the row in the file. Values are bound as parameters;
//! identifiers are always quoted.
//!
//! ## Failures
//!
//! Unreadable or empty files, unusable names, and tables that cannot be created abort the run
//! ([`LoadError`]). A row that cannot be inserted only stops its own table: the rows before it
//! are committed, the rows after it are skipped, and the next table is loaded as usual. The
//! failure is logged and reported in [`loader::LoadReport`].
//!
//! ## Quick example
//!
//! ```rust
//! use csv_to_db::db::SqliteDatabase;
//! use csv_to_db::loader::load;
//! use csv_to_db::source::{SourceOptions, TableSource};
//! use csv_to_db::types::ColumnType;
//!
//! # fn main() -> Result<(), csv_to_db::LoadError> {
//! let csv = "name,age,score\nAlice,30,4.5\nBob,25,5.0\n";
//! let scores = TableSource::from_reader("scores", csv.as_bytes(), &SourceOptions::default())?;
//! assert_eq!(
//!     scores.column_types().collect::<Vec<_>>(),
//!     vec![ColumnType::Text, ColumnType::Integer, ColumnType::Real]
//! );
//!
//! let mut db = SqliteDatabase::open_in_memory()?;
//! let report = load([&scores], &mut db)?;
//! assert_eq!(report.rows_inserted(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`source`]: CSV parsing and type inference
//! - [`loader`]: table creation, row insertion, per-table commits, observers
//! - [`db`]: the database handle trait and its SQLite implementation
//! - [`sql`]: statement text and identifier quoting
//! - [`config`]: run configuration (JSON or paths file)
//! - [`pipeline`]: config-to-database orchestration
//! - [`types`]: column types, schema and values
//! - [`error`]: error types

pub mod config;
pub mod db;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod source;
pub mod sql;
pub mod types;

pub use error::{DatabaseError, LoadError, LoadResult};
