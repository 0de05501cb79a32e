//! Dynamic binding: infer association path and column from parameter names.
//!
//! A parameter such as `group_permission_code=read` is split on `_`. The last
//! part names the column and the preceding parts are resolved as an association
//! path from the root entity. Every `(path, column)` pair becomes a single
//! `<column> IN (?)` condition holding all values supplied for it. Parameters
//! whose path does not resolve are dropped.

use indexmap::IndexMap;
use tracing::debug;

use crate::catalog::Catalog;
use crate::collector::{collect, Conditions};
use crate::error::FilterError;
use crate::resolver::PathResolver;
use crate::schema::{Arity, DynamicFilter, FieldDescriptor};
use crate::value::{FilterValue, Value};

pub const PARAMETER_SEPARATOR: char = '_';

/// Identifier characters allowed in a column taken from a parameter name
pub fn sane_identifier(name: &str) -> bool { !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') }

pub struct DynamicBinding<'c> {
    resolver: PathResolver<'c>,
    catalog: &'c Catalog,
    root: &'c str,
}

struct Binding {
    parameter: String,
    column: String,
    values: Vec<Value>,
}

impl<'c> DynamicBinding<'c> {
    pub fn new(catalog: &'c Catalog, root: &'c str) -> Self { Self { resolver: PathResolver::new(catalog), catalog, root } }

    /// Build a filter from raw parameter pairs, in the order they arrived
    pub fn filter<K, V>(&self, params: impl IntoIterator<Item = (K, V)>) -> Result<DynamicFilter, FilterError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut bindings: IndexMap<(String, String), Binding> = IndexMap::new();

        for (key, raw) in params {
            let key = key.as_ref();
            let parts: Vec<&str> = key.split(PARAMETER_SEPARATOR).collect();
            let Some((column, segments)) = parts.split_last() else { continue };
            if segments.is_empty() {
                debug!("{}: no association segment, skipping", key);
                continue;
            }
            if !sane_identifier(column) {
                debug!("{}: column {:?} is not an identifier, skipping", key, column);
                continue;
            }

            let resolved = match self.resolver.resolve(segments, self.root) {
                Ok(resolved) => resolved,
                Err(err) => {
                    debug!("{}: {}, skipping", key, err);
                    continue;
                }
            };

            let (column, value) = match resolved.entity.find_column(column) {
                Some(def) => {
                    let value = def.kind.parse(raw.as_ref()).ok_or_else(|| FilterError::InvalidValue {
                        parameter: key.to_owned(),
                        value: raw.as_ref().to_owned(),
                        kind: def.kind,
                    })?;
                    (def.name.to_owned(), value)
                }
                None => (column.to_string(), Value::Text(raw.as_ref().to_owned())),
            };

            bindings
                .entry((resolved.path, column.clone()))
                .or_insert_with(|| Binding { parameter: key.to_owned(), column, values: Vec::new() })
                .values
                .push(value);
        }

        let mut filter = DynamicFilter::new();
        for ((path, _), binding) in bindings {
            let descriptor = FieldDescriptor::owned(binding.parameter, path, format!("{} IN (?)", binding.column), Arity::Multi);
            filter.push(descriptor, Some(FilterValue::Multi(binding.values)));
        }
        Ok(filter)
    }

    pub fn collect<K, V>(&self, params: impl IntoIterator<Item = (K, V)>) -> Result<Conditions, FilterError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Ok(collect(&self.filter(params)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Association, Column, EntityDef, Link};
    use crate::plan::Condition;
    use crate::value::ColumnKind;

    fn catalog() -> Catalog {
        let join =
            |table: &'static str, owner_column: &'static str, target_column: &'static str| Link::JoinTable { table, owner_column, target_column };
        Catalog::new([
            EntityDef::new("User", "users", "id")
                .column(Column::new("ID", "id", ColumnKind::Integer))
                .column(Column::new("Name", "name", ColumnKind::Text))
                .association(Association::many("Devices", "Device", join("user_devices", "user_id", "device_id")))
                .association(Association::many("Groups", "Group", join("user_groups", "user_id", "group_id"))),
            EntityDef::new("Device", "devices", "id")
                .column(Column::new("ID", "id", ColumnKind::Integer))
                .column(Column::new("Name", "name", ColumnKind::Text)),
            EntityDef::new("Group", "groups", "id")
                .column(Column::new("ID", "id", ColumnKind::Integer))
                .column(Column::new("Name", "name", ColumnKind::Text))
                .association(Association::many("Permissions", "Permission", join("group_permissions", "group_id", "permission_id"))),
            EntityDef::new("Permission", "permissions", "id")
                .column(Column::new("ID", "id", ColumnKind::Integer))
                .column(Column::new("Code", "code", ColumnKind::Text)),
        ])
    }

    #[test]
    fn test_nested_parameter() -> Result<(), FilterError> {
        let catalog = catalog();
        let conditions = DynamicBinding::new(&catalog, "User").collect([("group_permission_code", "execute")])?;

        assert!(conditions.root.is_empty());
        assert_eq!(conditions.groups.len(), 1);
        let group = &conditions.groups["Groups.Permissions"];
        assert_eq!(group.conditions, vec![Condition::multi("code IN (?)", ["execute"])]);
        Ok(())
    }

    #[test]
    fn test_unknown_segment_dropped() -> Result<(), FilterError> {
        let catalog = catalog();
        let conditions = DynamicBinding::new(&catalog, "User").collect([("foo_bar", "1"), ("name", "x"), ("user_name", "x")])?;
        assert!(conditions.is_empty());
        Ok(())
    }

    #[test]
    fn test_repeated_and_equivalent_keys_merge() -> Result<(), FilterError> {
        let catalog = catalog();
        let conditions =
            DynamicBinding::new(&catalog, "User").collect([("device_name", "d1"), ("group_name", "admin"), ("devices_name", "d2")])?;

        assert_eq!(conditions.groups.keys().collect::<Vec<_>>(), vec!["Devices", "Groups"]);
        assert_eq!(conditions.groups["Devices"].conditions, vec![Condition::multi("name IN (?)", ["d1", "d2"])]);
        Ok(())
    }

    #[test]
    fn test_integer_column_is_coerced() -> Result<(), FilterError> {
        let catalog = catalog();
        let conditions = DynamicBinding::new(&catalog, "User").collect([("device_id", "2"), ("device_id", "1")])?;
        assert_eq!(conditions.groups["Devices"].conditions[0].values, vec![Value::Integer(2), Value::Integer(1)]);
        Ok(())
    }

    #[test]
    fn test_malformed_integer_is_rejected() {
        let catalog = catalog();
        let err = DynamicBinding::new(&catalog, "User").collect([("device_id", "two")]).unwrap_err();
        assert_eq!(err, FilterError::InvalidValue { parameter: "device_id".into(), value: "two".into(), kind: ColumnKind::Integer });
    }

    #[test]
    fn test_undeclared_column_stays_text() -> Result<(), FilterError> {
        let catalog = catalog();
        let conditions = DynamicBinding::new(&catalog, "User").collect([("group_label", "7")])?;
        assert_eq!(conditions.groups["Groups"].conditions, vec![Condition::multi("label IN (?)", ["7"])]);
        Ok(())
    }

    #[test]
    fn test_non_identifier_column_dropped() -> Result<(), FilterError> {
        let catalog = catalog();
        let conditions = DynamicBinding::new(&catalog, "User").collect([("group_name;drop", "x"), ("group_", "x")])?;
        assert!(conditions.is_empty());
        Ok(())
    }

    #[test]
    fn test_sane_identifier() {
        assert!(sane_identifier("code"));
        assert!(sane_identifier("created_at2"));
        assert!(!sane_identifier(""));
        assert!(!sane_identifier("na me"));
        assert!(!sane_identifier("\"x\""));
    }
}
