//! Whole-column type inference.
//!
//! A column's type is decided from every value in it: the tightest of INTEGER, REAL and TEXT that
//! accepts all of them. A later value can loosen the type, so classification runs over the full
//! column before any value is converted.

use crate::types::{ColumnType, Value};

/// Parse `raw` as a value of `column_type`.
///
/// Numeric parsing ignores surrounding whitespace. REAL only takes finite numbers: SQLite stores a
/// bound NaN as NULL, so `nan`, `inf` and `infinity` stay TEXT. TEXT keeps the raw string untouched
/// and always succeeds.
pub fn parse_as(raw: &str, column_type: ColumnType) -> Option<Value> {
    match column_type {
        ColumnType::Integer => raw.trim().parse::<i64>().ok().map(Value::Integer),
        ColumnType::Real => parse_finite(raw).map(Value::Real),
        ColumnType::Text => Some(Value::Text(raw.to_owned())),
    }
}

/// Whether `raw` is accepted by `column_type`.
pub fn fits(raw: &str, column_type: ColumnType) -> bool {
    match column_type {
        ColumnType::Integer => raw.trim().parse::<i64>().is_ok(),
        ColumnType::Real => parse_finite(raw).is_some(),
        ColumnType::Text => true,
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Infer the type of a column from all of its values.
///
/// An empty column is INTEGER.
pub fn infer_column_type<'a, I>(values: I) -> ColumnType
where
    I: IntoIterator<Item = &'a str>,
{
    let mut current = ColumnType::Integer;
    for raw in values {
        while !fits(raw, current) {
            current = loosen(current);
        }
        if current == ColumnType::Text {
            break;
        }
    }
    current
}

fn loosen(column_type: ColumnType) -> ColumnType {
    match column_type {
        ColumnType::Integer => ColumnType::Real,
        ColumnType::Real | ColumnType::Text => ColumnType::Text,
    }
}

/// Convert one raw cell into a typed value. `None` cells (padding) become [`Value::Null`].
pub fn convert(raw: Option<&str>, column_type: ColumnType) -> Value {
    match raw {
        None => Value::Null,
        Some(raw) => {
            parse_as(raw, column_type).unwrap_or_else(|| Value::Text(raw.to_owned()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_integers_stay_integer() {
        assert_eq!(infer_column_type(["1", "-2", "+3", "40"]), ColumnType::Integer);
    }

    #[test]
    fn one_decimal_loosens_to_real() {
        assert_eq!(infer_column_type(["1", "2.5", "3"]), ColumnType::Real);
        assert_eq!(infer_column_type(["1", "1e3"]), ColumnType::Real);
    }

    #[test]
    fn one_word_in_integer_column_forces_text() {
        assert_eq!(infer_column_type(["1", "2", "three"]), ColumnType::Text);
        assert_eq!(infer_column_type(["three", "1"]), ColumnType::Text);
    }

    #[test]
    fn empty_string_is_not_numeric() {
        assert_eq!(infer_column_type(["1", ""]), ColumnType::Text);
    }

    #[test]
    fn whitespace_around_numbers_is_ignored() {
        assert_eq!(infer_column_type([" 1", "2 "]), ColumnType::Integer);
        assert_eq!(convert(Some(" 1"), ColumnType::Integer), Value::Integer(1));
    }

    #[test]
    fn out_of_range_integer_falls_back_to_real() {
        assert_eq!(
            infer_column_type(["1", "99999999999999999999"]),
            ColumnType::Real
        );
    }

    #[test]
    fn non_finite_numbers_force_text() {
        assert_eq!(infer_column_type(["1.5", "nan"]), ColumnType::Text);
        assert_eq!(infer_column_type(["inf", "2"]), ColumnType::Text);
        assert_eq!(infer_column_type(["-Infinity"]), ColumnType::Text);
        assert_eq!(parse_as("NaN", ColumnType::Real), None);
        assert_eq!(infer_column_type(["1e308", "-2.5"]), ColumnType::Real);
    }

    #[test]
    fn no_values_is_integer() {
        assert_eq!(infer_column_type(std::iter::empty()), ColumnType::Integer);
    }

    #[test]
    fn convert_keeps_text_raw() {
        assert_eq!(
            convert(Some(" O'Brien"), ColumnType::Text),
            Value::Text(" O'Brien".to_string())
        );
        assert_eq!(convert(None, ColumnType::Text), Value::Null);
        assert_eq!(convert(Some("5.0"), ColumnType::Real), Value::Real(5.0));
    }
}
