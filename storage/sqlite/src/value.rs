//! SQLite value conversions

use preload_filter::{ColumnKind, Value};
use rusqlite::types::Value as SqliteValue;

use crate::error::SqliteError;

pub fn to_sql(value: &Value) -> SqliteValue {
    match value {
        Value::Null => SqliteValue::Null,
        Value::Boolean(b) => SqliteValue::Integer(*b as i64),
        Value::Integer(i) => SqliteValue::Integer(*i),
        Value::Text(s) => SqliteValue::Text(s.clone()),
    }
}

/// Decode column `column` as `kind`. SQLite stores booleans as integers.
pub fn decode(column: usize, value: SqliteValue, kind: ColumnKind) -> Result<Value, SqliteError> {
    let mismatch = |found| SqliteError::Decode { column, found, expected: kind };
    match (value, kind) {
        (SqliteValue::Null, _) => Ok(Value::Null),
        (SqliteValue::Integer(i), ColumnKind::Integer) => Ok(Value::Integer(i)),
        (SqliteValue::Integer(i), ColumnKind::Boolean) => Ok(Value::Boolean(i != 0)),
        (SqliteValue::Integer(i), ColumnKind::Text) => Ok(Value::Text(i.to_string())),
        (SqliteValue::Text(s), ColumnKind::Text) => Ok(Value::Text(s)),
        (SqliteValue::Text(_), _) => Err(mismatch("text")),
        (SqliteValue::Real(_), _) => Err(mismatch("real")),
        (SqliteValue::Blob(_), _) => Err(mismatch("blob")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_round_trips_through_integer() {
        assert_eq!(to_sql(&Value::Boolean(true)), SqliteValue::Integer(1));
        assert_eq!(decode(0, SqliteValue::Integer(1), ColumnKind::Boolean).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_text_in_integer_column_is_an_error() {
        let err = decode(2, SqliteValue::Text("x".into()), ColumnKind::Integer).unwrap_err();
        assert_eq!(err.to_string(), "column 2: cannot decode text as integer");
    }
}
