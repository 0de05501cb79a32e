//! Entity catalogue: the static adjacency list of entities and their associations.

use indexmap::IndexMap;

use crate::schema::join_path;
use crate::value::ColumnKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Field name used in responses
    pub field: &'static str,
    /// Column name in storage
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn new(field: &'static str, name: &'static str, kind: ColumnKind) -> Self { Self { field, name, kind } }
}

/// How an association is stored
#[derive(Debug, Clone, PartialEq)]
pub enum Link {
    /// Many-to-many through a join table
    JoinTable { table: &'static str, owner_column: &'static str, target_column: &'static str },
    /// One-to-many; the target table holds the owner's key
    ForeignKey { column: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Association {
    /// Canonical field name, used as the association path segment
    pub field: &'static str,
    /// Target entity name
    pub target: &'static str,
    pub cardinality: Cardinality,
    pub link: Link,
    /// Extra spellings accepted by the path resolver (irregular plurals, etc.)
    pub aliases: Vec<&'static str>,
}

impl Association {
    pub fn many(field: &'static str, target: &'static str, link: Link) -> Self {
        Self { field, target, cardinality: Cardinality::Many, link, aliases: Vec::new() }
    }

    pub fn one(field: &'static str, target: &'static str, link: Link) -> Self {
        Self { field, target, cardinality: Cardinality::One, link, aliases: Vec::new() }
    }

    pub fn alias(mut self, alias: &'static str) -> Self {
        self.aliases.push(alias);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityDef {
    pub name: &'static str,
    pub table: &'static str,
    /// Column name of the primary key, which must also be listed in `columns`
    pub primary_key: &'static str,
    pub columns: Vec<Column>,
    pub associations: Vec<Association>,
}

impl EntityDef {
    pub fn new(name: &'static str, table: &'static str, primary_key: &'static str) -> Self {
        Self { name, table, primary_key, columns: Vec::new(), associations: Vec::new() }
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn association(mut self, association: Association) -> Self {
        self.associations.push(association);
        self
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> { self.columns.iter().find(|column| column.name.eq_ignore_ascii_case(name)) }

    pub fn find_association(&self, field: &str) -> Option<&Association> { self.associations.iter().find(|assoc| assoc.field == field) }

    pub fn primary_key_column(&self) -> Option<&Column> { self.columns.iter().find(|column| column.name == self.primary_key) }
}

/// Read-only after construction; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entities: IndexMap<&'static str, EntityDef>,
}

impl Catalog {
    pub fn new(entities: impl IntoIterator<Item = EntityDef>) -> Self {
        Self { entities: entities.into_iter().map(|entity| (entity.name, entity)).collect() }
    }

    pub fn entity(&self, name: &str) -> Option<&EntityDef> { self.entities.get(name) }

    pub fn entities(&self) -> impl Iterator<Item = &EntityDef> { self.entities.values() }

    /// The entity reached by following `path` from `root`
    pub fn entity_at(&self, root: &str, path: &str) -> Option<&EntityDef> {
        let mut current = self.entity(root)?;
        if path.is_empty() {
            return Some(current);
        }
        for segment in path.split(crate::schema::PATH_SEPARATOR) {
            let association = current.find_association(segment)?;
            current = self.entity(association.target)?;
        }
        Some(current)
    }

    /// Every association path reachable from `root`, parents before children.
    /// An entity already on the current path is not re-entered.
    pub fn association_paths(&self, root: &str) -> Vec<String> {
        let mut paths = Vec::new();
        if let Some(entity) = self.entity(root) {
            let mut stack = vec![entity.name];
            self.collect_paths(entity, "", &mut stack, &mut paths);
        }
        paths
    }

    fn collect_paths(&self, entity: &EntityDef, prefix: &str, stack: &mut Vec<&'static str>, paths: &mut Vec<String>) {
        for association in &entity.associations {
            if stack.contains(&association.target) {
                continue;
            }
            let Some(target) = self.entity(association.target) else { continue };
            let path = join_path(prefix, association.field);
            paths.push(path.clone());
            stack.push(target.name);
            self.collect_paths(target, &path, stack, paths);
            stack.pop();
        }
    }
}
