use crate::value::ColumnKind;
use thiserror::Error;

/// Errors surfaced while binding request parameters to a filter
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FilterError {
    #[error("invalid value '{value}' for parameter {parameter}: expected {kind}")]
    InvalidValue { parameter: String, value: String, kind: ColumnKind },
}

/// A dynamic path segment that did not match any association
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolveError {
    #[error("unknown entity {0}")]
    UnknownEntity(String),
    #[error("no association matching '{segment}' on {entity}")]
    NotFound { segment: String, entity: String },
}

/// Descriptor misconfiguration. Never raised at request time
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    #[error("{field}: expected exactly one placeholder, found {found}")]
    PlaceholderCountMismatch { field: String, found: usize },
    #[error("{field}: multi-valued template must place its placeholder in an IN list")]
    MultiWithoutList { field: String },
    #[error("{field}: scalar template must not use an IN list")]
    ScalarWithList { field: String },
    #[error("duplicate parameter name {0}")]
    DuplicateParameter(String),
}
