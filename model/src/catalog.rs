use std::sync::Arc;

use once_cell::sync::Lazy;
use preload_filter::{Association, Catalog, Column, ColumnKind, EntityDef, Link};

pub const USER: &str = "User";
pub const DEVICE: &str = "Device";
pub const GROUP: &str = "Group";
pub const PERMISSION: &str = "Permission";

static CATALOG: Lazy<Arc<Catalog>> = Lazy::new(|| {
    Arc::new(Catalog::new([
        EntityDef::new(USER, "users", "id")
            .column(Column::new("ID", "id", ColumnKind::Integer))
            .column(Column::new("Name", "name", ColumnKind::Text))
            .association(Association::many(
                "Devices",
                DEVICE,
                Link::JoinTable { table: "user_devices", owner_column: "user_id", target_column: "device_id" },
            ))
            .association(Association::many(
                "Groups",
                GROUP,
                Link::JoinTable { table: "user_groups", owner_column: "user_id", target_column: "group_id" },
            )),
        EntityDef::new(DEVICE, "devices", "id")
            .column(Column::new("ID", "id", ColumnKind::Integer))
            .column(Column::new("Name", "name", ColumnKind::Text)),
        EntityDef::new(GROUP, "groups", "id")
            .column(Column::new("ID", "id", ColumnKind::Integer))
            .column(Column::new("Name", "name", ColumnKind::Text))
            .association(Association::many(
                "Permissions",
                PERMISSION,
                Link::JoinTable { table: "group_permissions", owner_column: "group_id", target_column: "permission_id" },
            )),
        EntityDef::new(PERMISSION, "permissions", "id")
            .column(Column::new("ID", "id", ColumnKind::Integer))
            .column(Column::new("Code", "code", ColumnKind::Text)),
    ]))
});

/// The process-wide entity catalogue
pub fn catalog() -> Arc<Catalog> { CATALOG.clone() }
