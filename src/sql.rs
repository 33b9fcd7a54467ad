//! SQL text generation.
//!
//! Identifiers are always emitted double-quoted and values are always bound as parameters; the
//! fully interpolated form of an insert is only ever produced for diagnostics (see
//! [`InsertStatement`]'s `Display` impl).

use std::fmt;

use crate::error::{LoadError, LoadResult};
use crate::types::{Schema, Value};

/// Name of the synthetic primary key column added to every table.
pub const ID_COLUMN: &str = "id";

/// Check that `name` can be used as a table or column identifier.
///
/// Any printable name is accepted because it is quoted on output. Rejected: empty names, names
/// with control characters, and names in SQLite's reserved `sqlite_` namespace.
pub fn validate_identifier(name: &str) -> LoadResult<()> {
    if name.is_empty() {
        return Err(LoadError::invalid_identifier(name, "name is empty"));
    }
    if name.chars().any(char::is_control) {
        return Err(LoadError::invalid_identifier(
            name,
            "name contains a control character",
        ));
    }
    if name
        .get(..7)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("sqlite_"))
    {
        return Err(LoadError::invalid_identifier(
            name,
            "names starting with 'sqlite_' are reserved",
        ));
    }
    Ok(())
}

/// Quote an identifier, doubling any embedded double quote.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Build the `CREATE TABLE` statement for `table` with `schema`'s columns.
pub fn create_table(table: &str, schema: &Schema) -> String {
    let mut sql = format!(
        "CREATE TABLE {} ({ID_COLUMN} INTEGER PRIMARY KEY AUTOINCREMENT",
        quote_identifier(table)
    );
    for field in &schema.fields {
        sql.push_str(", ");
        sql.push_str(&quote_identifier(&field.name));
        sql.push(' ');
        sql.push_str(field.column_type.as_sql());
    }
    sql.push(')');
    sql
}

/// Build the parameterized `INSERT` statement for a table with `columns` user columns.
///
/// Placeholder `?1` is the synthetic `id`, followed by one placeholder per column.
pub fn insert_into(table: &str, columns: usize) -> String {
    let placeholders: Vec<String> = (1..=columns + 1).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {} VALUES ({})",
        quote_identifier(table),
        placeholders.join(", ")
    )
}

/// One row's insert statement.
///
/// Executed through [`InsertStatement::sql`] and [`InsertStatement::params`]. `Display` renders
/// the statement with every value interpolated as a literal, which is what gets logged when the
/// row fails.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsertStatement<'a> {
    /// Zero-based row index, also used as the row's `id`.
    pub row_index: usize,
    table: &'a str,
    sql: &'a str,
    values: &'a [Value],
}

impl<'a> InsertStatement<'a> {
    /// Parameterized statement text.
    pub fn sql(&self) -> &'a str {
        self.sql
    }

    /// Bind parameters: the id followed by the row's values.
    pub fn params(&self) -> Vec<Value> {
        let mut params = Vec::with_capacity(self.values.len() + 1);
        params.push(Value::Integer(self.row_index as i64));
        params.extend(self.values.iter().cloned());
        params
    }
}

impl fmt::Display for InsertStatement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "INSERT INTO {} VALUES ({}",
            quote_identifier(self.table),
            self.row_index
        )?;
        for value in self.values {
            write!(f, ", {}", value.to_sql_literal())?;
        }
        f.write_str(")")
    }
}

/// Lazy iterator over a table's insert statements, in row order.
///
/// Cloning the iterator (or asking the source for a new one) restarts the sequence.
#[derive(Debug, Clone)]
pub struct InsertStatements<'a> {
    table: &'a str,
    sql: &'a str,
    rows: std::iter::Enumerate<std::slice::Iter<'a, Vec<Value>>>,
}

impl<'a> InsertStatements<'a> {
    pub(crate) fn new(table: &'a str, sql: &'a str, rows: &'a [Vec<Value>]) -> Self {
        Self {
            table,
            sql,
            rows: rows.iter().enumerate(),
        }
    }
}

impl<'a> Iterator for InsertStatements<'a> {
    type Item = InsertStatement<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (row_index, row) = self.rows.next()?;
        Some(InsertStatement {
            row_index,
            table: self.table,
            sql: self.sql,
            values: row.as_slice(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for InsertStatements<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnType, Field};

    #[test]
    fn quote_identifier_doubles_embedded_quotes() {
        assert_eq!(quote_identifier("people"), "\"people\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn validate_identifier_rejects_unusable_names() {
        assert!(validate_identifier("first name").is_ok());
        assert!(validate_identifier("Prices-2024").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("bad\tname").is_err());
        assert!(validate_identifier("SQLITE_master").is_err());
    }

    #[test]
    fn create_table_lists_synthetic_id_first() {
        let schema = Schema::new(vec![
            Field::new("name", ColumnType::Text),
            Field::new("age", ColumnType::Integer),
        ]);
        assert_eq!(
            create_table("people", &schema),
            "CREATE TABLE \"people\" (id INTEGER PRIMARY KEY AUTOINCREMENT, \"name\" TEXT, \"age\" INTEGER)"
        );
    }

    #[test]
    fn insert_into_numbers_placeholders_from_one() {
        assert_eq!(
            insert_into("people", 2),
            "INSERT INTO \"people\" VALUES (?1, ?2, ?3)"
        );
    }

    #[test]
    fn insert_statements_restart_and_render_literals() {
        let rows = vec![
            vec![Value::Text("O'Brien".to_string()), Value::Integer(30)],
            vec![Value::Text("Bob".to_string()), Value::Integer(25)],
        ];
        let sql = insert_into("people", 2);
        let stmts = InsertStatements::new("people", &sql, &rows);

        let rendered: Vec<String> = stmts.clone().map(|s| s.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "INSERT INTO \"people\" VALUES (0, 'O''Brien', 30)".to_string(),
                "INSERT INTO \"people\" VALUES (1, 'Bob', 25)".to_string(),
            ]
        );
        assert_eq!(stmts.len(), 2);

        let second = stmts.clone().nth(1).unwrap();
        assert_eq!(second.row_index, 1);
        assert_eq!(
            second.params(),
            vec![
                Value::Integer(1),
                Value::Text("Bob".to_string()),
                Value::Integer(25)
            ]
        );
    }
}
