//! Filter types for listing users.
//!
//! [`UserFilterV3`] is the flat form decoded straight from the query string.
//! [`UserFilter`] composes per-entity filters under association prefixes and
//! compiles to the same conditions for equivalent values.

use preload_filter::{Arity, FieldDescriptor, FilterField, FilterSpec, FilterValue};
use serde::Deserialize;

fn multi<T: Clone + Into<preload_filter::Value>>(values: &[T]) -> Option<FilterValue> {
    if values.is_empty() {
        None
    } else {
        Some(FilterValue::multi(values.iter().cloned()))
    }
}

fn scalar(value: &Option<String>) -> Option<FilterValue> { value.as_ref().map(FilterValue::scalar) }

pub mod v3 {
    use super::*;

    pub static USER_NAME: FieldDescriptor = FieldDescriptor::new("user_name", "", "users.name = ?", Arity::Scalar);
    pub static DEVICE_IDS: FieldDescriptor = FieldDescriptor::new("device_id", "Devices", "devices.id IN (?)", Arity::Multi);
    pub static DEVICE_NAMES: FieldDescriptor = FieldDescriptor::new("device_name", "Devices", "devices.name IN (?)", Arity::Multi);
    pub static GROUP_NAMES: FieldDescriptor = FieldDescriptor::new("group_name", "Groups", "groups.name IN (?)", Arity::Multi);
    pub static PERMISSION: FieldDescriptor = FieldDescriptor::new("permission", "Groups.Permissions", "permissions.code = ?", Arity::Scalar);
}

/// Flat user filter, one field per query parameter.
/// An empty list means the parameter was not supplied.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserFilterV3 {
    #[serde(rename = "user_name")]
    pub name: Option<String>,
    #[serde(rename = "device_id")]
    pub device_ids: Vec<u32>,
    #[serde(rename = "device_name")]
    pub device_names: Vec<String>,
    #[serde(rename = "group_name")]
    pub group_names: Vec<String>,
    #[serde(rename = "permission")]
    pub permission: Option<String>,
}

impl FilterSpec for UserFilterV3 {
    fn fields(&self) -> Vec<FilterField<'_>> {
        vec![
            FilterField::value(&v3::USER_NAME, scalar(&self.name)),
            FilterField::value(&v3::DEVICE_IDS, multi(&self.device_ids)),
            FilterField::value(&v3::DEVICE_NAMES, multi(&self.device_names)),
            FilterField::value(&v3::GROUP_NAMES, multi(&self.group_names)),
            FilterField::value(&v3::PERMISSION, scalar(&self.permission)),
        ]
    }
}

static USER_NAME: FieldDescriptor = FieldDescriptor::new("user_name", "", "users.name = ?", Arity::Scalar);
static DEVICE_IDS: FieldDescriptor = FieldDescriptor::new("device_id", "", "devices.id IN (?)", Arity::Multi);
static DEVICE_NAMES: FieldDescriptor = FieldDescriptor::new("device_name", "", "devices.name IN (?)", Arity::Multi);
static GROUP_NAMES: FieldDescriptor = FieldDescriptor::new("group_name", "", "groups.name IN (?)", Arity::Multi);
static PERMISSION_CODE: FieldDescriptor = FieldDescriptor::new("permission", "", "permissions.code = ?", Arity::Scalar);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceFilter {
    pub ids: Vec<u32>,
    pub names: Vec<String>,
}

impl FilterSpec for DeviceFilter {
    fn fields(&self) -> Vec<FilterField<'_>> {
        vec![FilterField::value(&DEVICE_IDS, multi(&self.ids)), FilterField::value(&DEVICE_NAMES, multi(&self.names))]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PermissionFilter {
    pub code: Option<String>,
}

impl FilterSpec for PermissionFilter {
    fn fields(&self) -> Vec<FilterField<'_>> { vec![FilterField::value(&PERMISSION_CODE, scalar(&self.code))] }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupFilter {
    pub names: Vec<String>,
    pub permissions: PermissionFilter,
}

impl FilterSpec for GroupFilter {
    fn fields(&self) -> Vec<FilterField<'_>> {
        vec![FilterField::value(&GROUP_NAMES, multi(&self.names)), FilterField::nested("Permissions", &self.permissions)]
    }
}

/// User filter composed from per-entity filters. Each nested filter's
/// descriptors are relative to the association it is mounted under.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub name: Option<String>,
    pub device: DeviceFilter,
    pub group: GroupFilter,
}

impl FilterSpec for UserFilter {
    fn fields(&self) -> Vec<FilterField<'_>> {
        vec![
            FilterField::value(&USER_NAME, scalar(&self.name)),
            FilterField::nested("Devices", &self.device),
            FilterField::nested("Groups", &self.group),
        ]
    }
}

impl From<UserFilterV3> for UserFilter {
    fn from(flat: UserFilterV3) -> Self {
        UserFilter {
            name: flat.name,
            device: DeviceFilter { ids: flat.device_ids, names: flat.device_names },
            group: GroupFilter { names: flat.group_names, permissions: PermissionFilter { code: flat.permission } },
        }
    }
}
