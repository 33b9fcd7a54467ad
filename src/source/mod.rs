//! Parsed, type-inferred CSV tables.
//!
//! A [`TableSource`] is built once from a CSV file and is immutable afterwards:
//!
//! - the table name is the file stem, verbatim
//! - the first non-blank line is the header; every other non-blank line is a data row
//! - each column gets the tightest of INTEGER / REAL / TEXT that accepts every value in it
//! - every cell is converted into a typed [`Value`] once, at construction
//!
//! ```no_run
//! use csv_to_db::source::TableSource;
//!
//! # fn main() -> Result<(), csv_to_db::LoadError> {
//! let people = TableSource::from_path("people.csv")?;
//! println!("{}", people.create_statement());
//! for stmt in people.insert_statements() {
//!     println!("{stmt}");
//! }
//! # Ok(())
//! # }
//! ```

mod csv;
pub mod infer;

use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{LoadError, LoadResult};
use crate::sql::{self, InsertStatements, ID_COLUMN};
use crate::types::{ColumnType, Field, Schema, Value};

/// What to do with a data row whose field count differs from the header's.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowWidthPolicy {
    /// Drop the row and record its line number in [`TableSource::rejected_rows`].
    #[default]
    Reject,
    /// Pad short rows with NULL and cut long rows down to the header width.
    PadOrTruncate,
}

/// Options controlling how a CSV file becomes a [`TableSource`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOptions {
    /// Policy for rows that do not match the header width.
    pub row_width_policy: RowWidthPolicy,
}

/// One CSV file, parsed and typed, ready to be loaded as a table.
#[derive(Debug, Clone)]
pub struct TableSource {
    name: String,
    path: Option<PathBuf>,
    schema: Schema,
    rows: Vec<Vec<Value>>,
    rejected_rows: Vec<u64>,
    create_sql: String,
    insert_sql: String,
}

impl TableSource {
    /// Parse the CSV file at `path` with default options.
    pub fn from_path(path: impl AsRef<Path>) -> LoadResult<Self> {
        Self::from_path_with_options(path, &SourceOptions::default())
    }

    /// Parse the CSV file at `path`.
    ///
    /// The whole file is read into memory. Fails with [`LoadError::Io`] if it cannot be read and
    /// with [`LoadError::EmptyFile`] if it has no header line.
    pub fn from_path_with_options(path: impl AsRef<Path>, options: &SourceOptions) -> LoadResult<Self> {
        let path = path.as_ref();
        let name = table_name_for(path)?;
        let bytes = fs::read(path)?;
        let mut source = Self::build(name, bytes.as_slice(), options, path)?;
        source.path = Some(path.to_path_buf());
        Ok(source)
    }

    /// Parse CSV text from `input` into a table called `name`.
    pub fn from_reader<R: Read>(name: impl Into<String>, input: R, options: &SourceOptions) -> LoadResult<Self> {
        let name = name.into();
        let label = PathBuf::from(format!("<{name}>"));
        Self::build(name, input, options, &label)
    }

    fn build<R: Read>(name: String, input: R, options: &SourceOptions, origin: &Path) -> LoadResult<Self> {
        sql::validate_identifier(&name)?;

        let raw = csv::read_raw_table(input)?.ok_or_else(|| LoadError::EmptyFile {
            path: origin.to_path_buf(),
        })?;
        validate_columns(&raw.header)?;
        let width = raw.header.len();

        let mut cells: Vec<Vec<Option<String>>> = Vec::with_capacity(raw.records.len());
        let mut rejected_rows = Vec::new();
        for record in raw.records {
            let found = record.fields.len();
            if found == width {
                cells.push(record.fields.into_iter().map(Some).collect());
                continue;
            }
            match options.row_width_policy {
                RowWidthPolicy::Reject => {
                    warn!(
                        table = %name,
                        line = record.line,
                        expected = width,
                        found,
                        "rejecting row with wrong field count"
                    );
                    rejected_rows.push(record.line);
                }
                RowWidthPolicy::PadOrTruncate => {
                    debug!(table = %name, line = record.line, expected = width, found, "padding/truncating row");
                    let mut row: Vec<Option<String>> = record.fields.into_iter().take(width).map(Some).collect();
                    row.resize(width, None);
                    cells.push(row);
                }
            }
        }

        // First pass: classify every column over its full value set.
        let column_types: Vec<ColumnType> = (0..width)
            .map(|col| infer::infer_column_type(cells.iter().filter_map(|row| row[col].as_deref())))
            .collect();

        // Second pass: convert every cell once, now that its column type is final.
        let rows: Vec<Vec<Value>> = cells
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&column_types)
                    .map(|(cell, &ty)| infer::convert(cell.as_deref(), ty))
                    .collect()
            })
            .collect();

        let schema = Schema::new(
            raw.header
                .into_iter()
                .zip(column_types)
                .map(|(col, ty)| Field::new(col, ty))
                .collect(),
        );
        let create_sql = sql::create_table(&name, &schema);
        let insert_sql = sql::insert_into(&name, schema.len());

        info!(
            table = %name,
            columns = schema.len(),
            rows = rows.len(),
            rejected = rejected_rows.len(),
            "parsed csv source"
        );

        Ok(Self {
            name,
            path: None,
            schema,
            rows,
            rejected_rows,
            create_sql,
            insert_sql,
        })
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path the source was read from, if it came from a file.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Column names and inferred types.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Column names, in header order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.schema.field_names()
    }

    /// Inferred column types, in header order.
    pub fn column_types(&self) -> impl Iterator<Item = ColumnType> + '_ {
        self.schema.column_types()
    }

    /// Typed rows, in file order. Every row has one value per column.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 1-based line numbers of rows dropped by [`RowWidthPolicy::Reject`].
    pub fn rejected_rows(&self) -> &[u64] {
        &self.rejected_rows
    }

    /// The `CREATE TABLE` statement for this source.
    pub fn create_statement(&self) -> &str {
        &self.create_sql
    }

    /// One insert statement per row, in row order.
    ///
    /// The iterator is lazy; call again to start over.
    pub fn insert_statements(&self) -> InsertStatements<'_> {
        InsertStatements::new(&self.name, &self.insert_sql, &self.rows)
    }
}

/// Table name for a CSV path: the file name without its extension.
pub fn table_name_for(path: &Path) -> LoadResult<String> {
    let stem = path
        .file_stem()
        .ok_or_else(|| LoadError::invalid_identifier(&path.display().to_string(), "path has no file name"))?;
    stem.to_str()
        .map(str::to_owned)
        .ok_or_else(|| LoadError::invalid_identifier(&stem.to_string_lossy(), "file name is not valid UTF-8"))
}

fn validate_columns(header: &[String]) -> LoadResult<()> {
    let mut seen = HashSet::with_capacity(header.len());
    for col in header {
        sql::validate_identifier(col)?;
        let folded = col.to_lowercase();
        if folded == ID_COLUMN {
            return Err(LoadError::invalid_identifier(
                col,
                "collides with the synthetic id column",
            ));
        }
        if !seen.insert(folded) {
            return Err(LoadError::invalid_identifier(col, "duplicate column name"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> TableSource {
        TableSource::from_reader("t", input.as_bytes(), &SourceOptions::default()).unwrap()
    }

    #[test]
    fn rows_align_with_columns() {
        let src = parse("a,b,c\n1,x,2.5\n2,y,3\n");
        assert_eq!(src.columns().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        for row in src.rows() {
            assert_eq!(row.len(), src.schema().len());
        }
    }

    #[test]
    fn rejects_rows_with_wrong_width_by_default() {
        let src = parse("a,b\n1,2\n3\n4,5,6\n7,8\n");
        assert_eq!(src.row_count(), 2);
        assert_eq!(src.rejected_rows(), &[3, 4]);
        assert_eq!(src.rows()[1], vec![Value::Integer(7), Value::Integer(8)]);
    }

    #[test]
    fn pads_and_truncates_when_asked() {
        let opts = SourceOptions {
            row_width_policy: RowWidthPolicy::PadOrTruncate,
        };
        let src = TableSource::from_reader("t", "a,b\n1\n2,3,4\n".as_bytes(), &opts).unwrap();
        assert!(src.rejected_rows().is_empty());
        assert_eq!(
            src.rows(),
            &[
                vec![Value::Integer(1), Value::Null],
                vec![Value::Integer(2), Value::Integer(3)],
            ]
        );
        assert_eq!(
            src.column_types().collect::<Vec<_>>(),
            vec![ColumnType::Integer, ColumnType::Integer]
        );
    }

    #[test]
    fn header_only_file_has_no_rows() {
        let src = parse("a,b\n");
        assert_eq!(src.row_count(), 0);
        assert_eq!(src.insert_statements().count(), 0);
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = TableSource::from_reader("t", "".as_bytes(), &SourceOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::EmptyFile { .. }));
    }

    #[test]
    fn reserved_and_duplicate_columns_are_rejected() {
        for input in ["ID,name\n1,a\n", "a,A\n1,2\n", "a,,b\n1,2,3\n"] {
            let err = TableSource::from_reader("t", input.as_bytes(), &SourceOptions::default()).unwrap_err();
            assert!(matches!(err, LoadError::InvalidIdentifier { .. }), "{input:?}");
        }
    }

    #[test]
    fn table_name_is_file_stem_verbatim() {
        assert_eq!(table_name_for(Path::new("data/My Sales.csv")).unwrap(), "My Sales");
        assert_eq!(table_name_for(Path::new("archive.2024.csv")).unwrap(), "archive.2024");
    }
}
