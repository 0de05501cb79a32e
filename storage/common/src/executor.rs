//! Plan execution: one query for the root rows, then one query per association
//! path, processed parents first. Association conditions restrict only the rows
//! loaded for that path; they never remove root rows.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::{IndexMap, IndexSet};
use preload_filter::schema::{join_path, PATH_SEPARATOR};
use preload_filter::{Association, Cardinality, Catalog, ColumnKind, Condition, EntityDef, Link, QueryPlan, Value};
use tracing::debug;

use crate::ddl::create_tables;
use crate::error::StorageError;
use crate::record::{Record, Related};
use crate::sql_builder::{qualified, SqlBuilder};
use crate::traits::{SqlConnection, StorageExecutor};

pub struct Executor<C> {
    connection: C,
    catalog: Arc<Catalog>,
}

/// One association path to preload
#[derive(Debug, PartialEq)]
pub struct LoadStep<'p> {
    pub path: String,
    pub conditions: &'p [Condition],
}

/// Every path in the plan plus any missing parents, ordered by depth.
/// Implicit parents load unconditionally unless the plan has its own group for them.
pub fn load_order(plan: &QueryPlan) -> Vec<LoadStep<'_>> {
    let mut order: IndexMap<String, &[Condition]> = IndexMap::new();

    for (path, group) in plan.associations() {
        let mut prefix = String::new();
        let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        for segment in &segments[..segments.len() - 1] {
            prefix = join_path(&prefix, segment);
            order.entry(prefix.clone()).or_insert(&[]);
        }
        order.insert(path.clone(), group.conditions.as_slice());
    }

    let mut steps: Vec<_> = order.into_iter().map(|(path, conditions)| LoadStep { path, conditions }).collect();
    steps.sort_by_key(|step| step.path.matches(PATH_SEPARATOR).count());
    steps
}

fn split_parent(path: &str) -> (&str, &str) { path.rsplit_once(PATH_SEPARATOR).unwrap_or(("", path)) }

fn select_fields(def: &EntityDef) -> Vec<String> { def.columns.iter().map(|column| qualified(def.table, column.name)).collect() }

fn column_kinds(def: &EntityDef) -> Vec<ColumnKind> { def.columns.iter().map(|column| column.kind).collect() }

fn key_kind(def: &EntityDef) -> ColumnKind { def.primary_key_column().map(|pk| pk.kind).unwrap_or(ColumnKind::Integer) }

fn attach<'a>(parents: impl Iterator<Item = &'a mut Record>, owner: &EntityDef, association: &Association, children: &HashMap<Value, Vec<Record>>) {
    for parent in parents {
        let rows = children.get(parent.key()).cloned().unwrap_or_default();
        let related = match association.cardinality {
            Cardinality::Many => Related::Many(rows),
            Cardinality::One => Related::One(rows.into_iter().next().map(Box::new)),
        };
        parent.set_related(association.field, related);
        parent.sort_related(owner);
    }
}

impl<C: SqlConnection> Executor<C> {
    pub fn new(connection: C, catalog: Arc<Catalog>) -> Self { Self { connection, catalog } }

    pub fn connection(&self) -> &C { &self.connection }

    async fn load_root(&self, def: &EntityDef, conditions: &[Condition]) -> Result<Vec<Record>, StorageError> {
        let mut builder = SqlBuilder::with_fields(select_fields(def));
        builder.table_name(def.table).order_by(qualified(def.table, def.primary_key));
        builder.conjunction(conditions)?;

        let (sql, args) = builder.build(self.connection.placeholder())?;
        debug!("Executor.load_root: {} {:?}", sql, args);
        let rows = self.connection.query(&sql, args, column_kinds(def)).await?;
        rows.into_iter().map(|row| Record::from_row(def, row)).collect()
    }

    /// Load the targets of `association` for the given owner keys, each paired with its owner's key
    async fn load_association(
        &self,
        owner: &EntityDef,
        association: &Association,
        target: &EntityDef,
        owner_keys: &[Value],
        conditions: &[Condition],
    ) -> Result<Vec<(Value, Record)>, StorageError> {
        let owner_ref = match &association.link {
            Link::JoinTable { table, owner_column, .. } => qualified(table, owner_column),
            Link::ForeignKey { column } => qualified(target.table, column),
        };

        let mut fields = vec![owner_ref.clone()];
        fields.extend(select_fields(target));
        let mut builder = SqlBuilder::with_fields(fields);
        builder.table_name(target.table);
        if let Link::JoinTable { table, target_column, .. } = &association.link {
            builder.join(table, format!("{} = {}", qualified(table, target_column), qualified(target.table, target.primary_key)));
        }
        builder.order_by(qualified(target.table, target.primary_key));

        builder.sql(format!("{} IN (", owner_ref));
        builder.list(owner_keys);
        builder.sql(")");
        builder.conjunction(conditions)?;

        let (sql, args) = builder.build(self.connection.placeholder())?;
        debug!("Executor.load_association({}.{}): {} {:?}", owner.name, association.field, sql, args);

        let mut kinds = vec![key_kind(owner)];
        kinds.extend(column_kinds(target));
        let rows = self.connection.query(&sql, args, kinds).await?;

        rows.into_iter()
            .map(|mut row| {
                if row.is_empty() {
                    return Err(StorageError::Decode(format!("{}: empty row", association.field)));
                }
                let owner_key = row.remove(0);
                Ok((owner_key, Record::from_row(target, row)?))
            })
            .collect()
    }
}

#[async_trait]
impl<C: SqlConnection> StorageExecutor for Executor<C> {
    async fn execute(&self, plan: &QueryPlan, root: &str) -> Result<Vec<Record>, StorageError> {
        let root_def = self.catalog.entity(root).ok_or_else(|| StorageError::UnknownEntity(root.to_owned()))?;
        let mut roots = self.load_root(root_def, plan.root()).await?;
        if roots.is_empty() {
            return Ok(roots);
        }

        let steps = load_order(plan);
        let mut loaded: HashMap<String, Vec<(Value, Record)>> = HashMap::new();
        let mut links: Vec<(&EntityDef, &Association)> = Vec::with_capacity(steps.len());

        for step in &steps {
            let (parent, field) = split_parent(&step.path);
            let unknown = || StorageError::UnknownAssociation { entity: root.to_owned(), path: step.path.clone() };
            let owner = self.catalog.entity_at(root, parent).ok_or_else(unknown)?;
            let association = owner.find_association(field).ok_or_else(unknown)?;
            let target = self.catalog.entity(association.target).ok_or_else(|| StorageError::UnknownEntity(association.target.to_owned()))?;

            let owner_keys: IndexSet<Value> = if parent.is_empty() {
                roots.iter().map(|record| record.key().clone()).collect()
            } else {
                loaded.get(parent).into_iter().flatten().map(|(_, record)| record.key().clone()).collect()
            };
            let owner_keys: Vec<Value> = owner_keys.into_iter().collect();

            let rows = if owner_keys.is_empty() {
                Vec::new()
            } else {
                self.load_association(owner, association, target, &owner_keys, step.conditions).await?
            };
            debug!("Executor.execute: {} loaded {} rows", step.path, rows.len());
            loaded.insert(step.path.clone(), rows);
            links.push((owner, association));
        }

        // deepest paths first, so each level is complete before it is copied into its parents
        for (step, (owner, association)) in steps.iter().zip(links).rev() {
            let mut children: HashMap<Value, Vec<Record>> = HashMap::new();
            for (owner_key, record) in loaded.remove(&step.path).unwrap_or_default() {
                children.entry(owner_key).or_default().push(record);
            }

            let (parent, _) = split_parent(&step.path);
            if parent.is_empty() {
                attach(roots.iter_mut(), owner, association, &children);
            } else if let Some(rows) = loaded.get_mut(parent) {
                attach(rows.iter_mut().map(|(_, record)| record), owner, association, &children);
            }
        }

        Ok(roots)
    }

    async fn migrate(&self) -> Result<(), StorageError> {
        for statement in create_tables(&self.catalog) {
            debug!("Executor.migrate: {}", statement);
            self.connection.batch_execute(&statement).await?;
        }
        Ok(())
    }

    async fn seed(&self, sql: &str) -> Result<(), StorageError> { self.connection.batch_execute(sql).await }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::sql_builder::Placeholder;
    use preload_filter::{PredicateGroup, QueryPlanBuilder};
    use preload_model::{catalog, USER};

    #[test]
    fn test_load_order_adds_parents() {
        let plan = QueryPlanBuilder::new().restrict("Groups.Permissions", Condition::scalar("permissions.code = ?", "read")).build();
        let steps = load_order(&plan);
        assert_eq!(steps.iter().map(|s| s.path.as_str()).collect::<Vec<_>>(), vec!["Groups", "Groups.Permissions"]);
        assert!(steps[0].conditions.is_empty());
        assert_eq!(steps[1].conditions.len(), 1);
    }

    #[test]
    fn test_load_order_keeps_parent_conditions() {
        let mut conditions = preload_filter::Conditions::default();
        let mut permissions = PredicateGroup::new("Groups.Permissions");
        permissions.push(Condition::scalar("permissions.code = ?", "read"));
        conditions.groups.insert("Groups.Permissions".into(), permissions);
        let mut groups = PredicateGroup::new("Groups");
        groups.push(Condition::multi("groups.name IN (?)", ["admin"]));
        conditions.groups.insert("Groups".into(), groups);

        let plan = preload_filter::build(conditions);
        let steps = load_order(&plan);
        assert_eq!(steps[0].path, "Groups");
        assert_eq!(steps[0].conditions, &[Condition::multi("groups.name IN (?)", ["admin"])]);
    }

    /// Replays canned rows by table name and records every statement
    #[derive(Default)]
    struct CannedConnection {
        rows: HashMap<&'static str, Vec<Vec<Value>>>,
        statements: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SqlConnection for CannedConnection {
        fn placeholder(&self) -> Placeholder { Placeholder::Numbered }

        async fn query(&self, sql: &str, _args: Vec<Value>, _kinds: Vec<ColumnKind>) -> Result<Vec<Vec<Value>>, StorageError> {
            self.statements.lock().unwrap().push(sql.to_owned());
            let table = sql.split(" FROM ").nth(1).and_then(|rest| rest.split('"').nth(1)).unwrap_or_default();
            Ok(self.rows.get(table).cloned().unwrap_or_default())
        }

        async fn batch_execute(&self, sql: &str) -> Result<(), StorageError> {
            self.statements.lock().unwrap().push(sql.to_owned());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_no_preload_queries_without_roots() -> anyhow::Result<()> {
        let executor = Executor::new(CannedConnection::default(), catalog());
        let plan = QueryPlanBuilder::new().eager_load_all(&catalog(), USER).build();
        assert!(executor.execute(&plan, USER).await?.is_empty());
        assert_eq!(executor.connection().statements.lock().unwrap().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_children_attach_to_every_parent() -> anyhow::Result<()> {
        let mut connection = CannedConnection::default();
        let int = Value::Integer;
        connection.rows.insert("users", vec![vec![int(1), Value::from("John Doe")], vec![int(2), Value::from("Jane")]]);
        connection.rows.insert("groups", vec![vec![int(1), int(1), Value::from("admin")], vec![int(2), int(1), Value::from("admin")]]);
        let executor = Executor::new(connection, catalog());

        let plan = QueryPlanBuilder::new().eager_load("Groups").build();
        let users = executor.execute(&plan, USER).await?;
        let counts: Vec<_> = users
            .iter()
            .map(|user| match user.related("Groups") {
                Some(Related::Many(groups)) => groups.len(),
                _ => 0,
            })
            .collect();
        assert_eq!(counts, vec![1, 1]);

        let statements = executor.connection().statements.lock().unwrap();
        assert_eq!(
            statements[1],
            r#"SELECT "user_groups"."user_id", "groups"."id", "groups"."name" FROM "groups" INNER JOIN "user_groups" ON "user_groups"."group_id" = "groups"."id" WHERE "user_groups"."user_id" IN ($1, $2) ORDER BY "groups"."id""#
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_associations_follow_catalogue_order() -> anyhow::Result<()> {
        let mut connection = CannedConnection::default();
        let int = Value::Integer;
        connection.rows.insert("users", vec![vec![int(1), Value::from("John Doe")]]);
        connection.rows.insert("devices", vec![vec![int(1), int(2), Value::from("device2")]]);
        connection.rows.insert("groups", vec![vec![int(1), int(1), Value::from("admin")]]);
        let executor = Executor::new(connection, catalog());

        let plan = QueryPlanBuilder::new().eager_load_all(&catalog(), USER).build();
        let users = executor.execute(&plan, USER).await?;
        assert_eq!(
            serde_json::to_string(&users)?,
            r#"[{"ID":1,"Name":"John Doe","Devices":[{"ID":2,"Name":"device2"}],"Groups":[{"ID":1,"Name":"admin","Permissions":[]}]}]"#
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_migrate_runs_all_statements() -> anyhow::Result<()> {
        let executor = Executor::new(CannedConnection::default(), catalog());
        executor.migrate().await?;
        assert_eq!(executor.connection().statements.lock().unwrap().len(), create_tables(&catalog()).len());
        Ok(())
    }
}
