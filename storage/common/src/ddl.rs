//! Table creation derived from the catalogue.

use indexmap::IndexMap;
use preload_filter::{Catalog, ColumnKind, Link};

use crate::sql_builder::quote;

pub fn column_type(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Integer => "BIGINT",
        ColumnKind::Text => "TEXT",
        ColumnKind::Boolean => "BOOLEAN",
    }
}

/// `CREATE TABLE IF NOT EXISTS` statements for every entity table and link table.
///
/// Entity tables come first, in catalogue order. A foreign-key link adds its
/// column to the target table; a join table is created once even if several
/// associations share it.
pub fn create_tables(catalog: &Catalog) -> Vec<String> {
    let mut foreign_keys: IndexMap<&str, Vec<&str>> = IndexMap::new();
    let mut join_tables: IndexMap<&str, (String, String)> = IndexMap::new();

    for entity in catalog.entities() {
        let owner_key = entity.primary_key_column().map(|pk| pk.kind).unwrap_or(ColumnKind::Integer);
        for association in &entity.associations {
            let Some(target) = catalog.entity(association.target) else { continue };
            let target_key = target.primary_key_column().map(|pk| pk.kind).unwrap_or(ColumnKind::Integer);
            match &association.link {
                Link::ForeignKey { column } => {
                    let columns = foreign_keys.entry(target.table).or_default();
                    if !columns.contains(column) {
                        columns.push(*column);
                    }
                }
                Link::JoinTable { table, owner_column, target_column } => {
                    join_tables.entry(*table).or_insert_with(|| {
                        (
                            format!("{} {} NOT NULL", quote(owner_column), column_type(owner_key)),
                            format!("{} {} NOT NULL", quote(target_column), column_type(target_key)),
                        )
                    });
                }
            }
        }
    }

    let mut statements = Vec::new();
    for entity in catalog.entities() {
        let mut columns: Vec<String> = entity
            .columns
            .iter()
            .map(|column| {
                let constraint = if column.name == entity.primary_key { "PRIMARY KEY" } else { "NOT NULL" };
                format!("{} {} {}", quote(column.name), column_type(column.kind), constraint)
            })
            .collect();
        for fk in foreign_keys.get(entity.table).into_iter().flatten() {
            columns.push(format!("{} BIGINT", quote(fk)));
        }
        statements.push(format!("CREATE TABLE IF NOT EXISTS {} ({})", quote(entity.table), columns.join(", ")));
    }

    for (table, (owner, target)) in join_tables {
        statements.push(format!("CREATE TABLE IF NOT EXISTS {} ({}, {})", quote(table), owner, target));
    }

    statements
}
