//! Filter schema: the descriptor tables that replace struct-tag scanning.
//!
//! Each filter type declares, once, a static table of [`FieldDescriptor`]s and
//! implements [`FilterSpec`] by pairing each descriptor with its current value.
//! Nested filters are listed as [`FilterField::Nested`] under an association
//! prefix which is joined to the association paths of their own descriptors.

use std::borrow::Cow;
use std::collections::HashSet;

use crate::error::SchemaError;
use crate::value::FilterValue;

/// Separator between segments of an association path
pub const PATH_SEPARATOR: char = '.';

/// Whether a field binds one value or a list of values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Scalar,
    Multi,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Query-string parameter name
    pub external_name: Cow<'static, str>,
    /// Association path this condition applies to, relative to the enclosing spec. Empty for the root.
    pub association: Cow<'static, str>,
    /// Condition with `?` placeholders
    pub template: Cow<'static, str>,
    pub arity: Arity,
}

impl FieldDescriptor {
    pub const fn new(external_name: &'static str, association: &'static str, template: &'static str, arity: Arity) -> Self {
        Self { external_name: Cow::Borrowed(external_name), association: Cow::Borrowed(association), template: Cow::Borrowed(template), arity }
    }

    pub fn owned(external_name: impl Into<String>, association: impl Into<String>, template: impl Into<String>, arity: Arity) -> Self {
        Self {
            external_name: Cow::Owned(external_name.into()),
            association: Cow::Owned(association.into()),
            template: Cow::Owned(template.into()),
            arity,
        }
    }

    pub fn placeholders(&self) -> usize { self.template.matches('?').count() }

    /// Check that the template agrees with the declared arity
    pub fn validate(&self) -> Result<(), SchemaError> {
        let field = self.external_name.to_string();
        let found = self.placeholders();
        if found != 1 {
            return Err(SchemaError::PlaceholderCountMismatch { field, found });
        }

        let compact: String = self.template.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_ascii_uppercase();
        let in_list = compact.contains("IN(?)");
        match self.arity {
            Arity::Multi if !in_list => Err(SchemaError::MultiWithoutList { field }),
            Arity::Scalar if in_list => Err(SchemaError::ScalarWithList { field }),
            _ => Ok(()),
        }
    }
}

pub enum FilterField<'a> {
    Value { descriptor: &'a FieldDescriptor, value: Option<FilterValue> },
    Nested { association: &'a str, spec: &'a dyn FilterSpec },
}

impl<'a> FilterField<'a> {
    pub fn value(descriptor: &'a FieldDescriptor, value: Option<FilterValue>) -> Self { FilterField::Value { descriptor, value } }

    pub fn nested(association: &'a str, spec: &'a dyn FilterSpec) -> Self { FilterField::Nested { association, spec } }
}

/// A populated filter: its fields in declaration order
pub trait FilterSpec {
    fn fields(&self) -> Vec<FilterField<'_>>;

    fn schema_errors(&self) -> Vec<SchemaError>
    where Self: Sized {
        schema_errors(self)
    }
}

/// Join an association prefix and a relative path
pub fn join_path(prefix: &str, path: &str) -> String {
    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => path.to_owned(),
        (false, true) => prefix.to_owned(),
        (false, false) => format!("{prefix}{PATH_SEPARATOR}{path}"),
    }
}

/// Visit every descriptor reachable from `spec` with its fully joined association path
pub fn walk(spec: &dyn FilterSpec, prefix: &str, visit: &mut dyn FnMut(&str, &FieldDescriptor, Option<FilterValue>)) {
    for field in spec.fields() {
        match field {
            FilterField::Value { descriptor, value } => {
                let path = join_path(prefix, &descriptor.association);
                visit(&path, descriptor, value);
            }
            FilterField::Nested { association, spec } => {
                let nested = join_path(prefix, association);
                walk(spec, &nested, visit);
            }
        }
    }
}

/// Report descriptor misconfiguration for a filter type
pub fn schema_errors(spec: &dyn FilterSpec) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    walk(spec, "", &mut |_, descriptor, _| {
        if let Err(err) = descriptor.validate() {
            errors.push(err);
        }
        if !seen.insert(descriptor.external_name.to_string()) {
            errors.push(SchemaError::DuplicateParameter(descriptor.external_name.to_string()));
        }
    });
    errors
}

/// A filter assembled at runtime rather than declared as a type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicFilter {
    fields: Vec<(FieldDescriptor, Option<FilterValue>)>,
}

impl DynamicFilter {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, descriptor: FieldDescriptor, value: Option<FilterValue>) -> &mut Self {
        self.fields.push((descriptor, value));
        self
    }

    pub fn with(mut self, descriptor: FieldDescriptor, value: Option<FilterValue>) -> Self {
        self.push(descriptor, value);
        self
    }

    pub fn len(&self) -> usize { self.fields.len() }

    pub fn is_empty(&self) -> bool { self.fields.is_empty() }
}

impl FilterSpec for DynamicFilter {
    fn fields(&self) -> Vec<FilterField<'_>> { self.fields.iter().map(|(descriptor, value)| FilterField::value(descriptor, value.clone())).collect() }
}
