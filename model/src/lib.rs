//! Domain model: users, their devices and groups, and group permissions.

pub mod catalog;
pub mod entities;
pub mod filters;

pub use catalog::{catalog, DEVICE, GROUP, PERMISSION, USER};
pub use entities::{Device, Group, Permission, User};
pub use filters::{DeviceFilter, GroupFilter, PermissionFilter, UserFilter, UserFilterV3};

/// Sample rows loaded by `--seed`
pub const SEED_SQL: &str = include_str!("../seed.sql");
