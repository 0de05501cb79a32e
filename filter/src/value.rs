use serde::{Deserialize, Serialize};
use std::fmt;

/// A bound argument or a decoded column value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Text(String),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self { Value::Text(value.to_owned()) }
}

impl From<String> for Value {
    fn from(value: String) -> Self { Value::Text(value) }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self { Value::Text(value.clone()) }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self { Value::Integer(value) }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self { Value::Integer(value as i64) }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self { Value::Boolean(value) }
}

/// Storage type of a column, used to decode rows and to coerce raw parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Integer,
    Text,
    Boolean,
}

impl ColumnKind {
    /// Parse a raw query-string value into this kind
    pub fn parse(&self, raw: &str) -> Option<Value> {
        match self {
            ColumnKind::Integer => raw.trim().parse::<i64>().ok().map(Value::Integer),
            ColumnKind::Text => Some(Value::Text(raw.to_owned())),
            ColumnKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "t" => Some(Value::Boolean(true)),
                "false" | "0" | "f" => Some(Value::Boolean(false)),
                _ => None,
            },
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Integer => write!(f, "integer"),
            ColumnKind::Text => write!(f, "text"),
            ColumnKind::Boolean => write!(f, "boolean"),
        }
    }
}

/// The active value held by a filter field
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Scalar(Value),
    Multi(Vec<Value>),
}

impl FilterValue {
    pub fn scalar(value: impl Into<Value>) -> Self { FilterValue::Scalar(value.into()) }

    pub fn multi<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self { FilterValue::Multi(values.into_iter().map(Into::into).collect()) }

    /// Expand into the bound argument list, preserving element order
    pub fn into_values(self) -> Vec<Value> {
        match self {
            FilterValue::Scalar(value) => vec![value],
            FilterValue::Multi(values) => values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_column() {
        assert_eq!(ColumnKind::Integer.parse(" 42"), Some(Value::Integer(42)));
        assert_eq!(ColumnKind::Integer.parse("forty-two"), None);
    }

    #[test]
    fn test_parse_boolean_column() {
        assert_eq!(ColumnKind::Boolean.parse("TRUE"), Some(Value::Boolean(true)));
        assert_eq!(ColumnKind::Boolean.parse("0"), Some(Value::Boolean(false)));
        assert_eq!(ColumnKind::Boolean.parse("maybe"), None);
    }

    #[test]
    fn test_multi_preserves_order() {
        let values = FilterValue::multi(["d2", "d1", "d3"]).into_values();
        assert_eq!(values, vec![Value::from("d2"), Value::from("d1"), Value::from("d3")]);
    }

    #[test]
    fn test_value_serializes_untagged() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_string(&Value::Integer(7))?, "7");
        assert_eq!(serde_json::to_string(&Value::Null)?, "null");
        assert_eq!(serde_json::to_string(&Value::from("x"))?, r#""x""#);
        Ok(())
    }
}
