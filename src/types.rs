//! Core data model types for loading.
//!
//! A parsed CSV file becomes a [`crate::source::TableSource`], whose shape is a [`Schema`] (an
//! ordered list of typed [`Field`]s) and whose cells are typed [`Value`]s.

use std::fmt;

use rusqlite::ToSql;
use rusqlite::types::{ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// SQL type inferred for a column.
///
/// Variants are ordered from tightest to loosest; inference only ever moves a column forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Base-10 64-bit signed integer.
    Integer,
    /// 64-bit floating point number.
    Real,
    /// Anything else.
    Text,
}

impl ColumnType {
    /// SQL spelling used in `CREATE TABLE`.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A single named, typed column in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Column name, verbatim from the header line.
    pub name: String,
    /// Inferred column type.
    pub column_type: ColumnType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Ordered list of fields describing a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Iterate column types in order.
    pub fn column_types(&self) -> impl Iterator<Item = ColumnType> + '_ {
        self.fields.iter().map(|f| f.column_type)
    }
}

/// A single typed cell of a table row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing cell. Only produced when short rows are padded.
    Null,
    /// Value of an INTEGER column.
    Integer(i64),
    /// Value of a REAL column.
    Real(f64),
    /// Value of a TEXT column, stored unescaped.
    Text(String),
}

impl Value {
    /// Render the value as an SQL literal.
    ///
    /// Text is wrapped in single quotes with every embedded single quote doubled, so `O'Brien`
    /// renders as `'O''Brien'`. The stored text is never modified, so rendering is repeatable.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_owned(),
            Self::Integer(v) => v.to_string(),
            // `{:?}` keeps the fractional part (`5.0`, not `5`).
            Self::Real(v) => format!("{v:?}"),
            Self::Text(s) => quote_literal(s),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Self::Integer(v) => ToSqlOutput::Borrowed(ValueRef::Integer(*v)),
            Self::Real(v) => ToSqlOutput::Borrowed(ValueRef::Real(*v)),
            Self::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// Standard SQL string-literal escaping.
pub fn quote_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}
