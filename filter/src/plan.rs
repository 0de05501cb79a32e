use indexmap::IndexMap;
use tracing::warn;

use crate::catalog::Catalog;
use crate::collector::Conditions;
use crate::schema::Arity;
use crate::value::Value;

/// A predicate template together with its bound values
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub template: String,
    pub values: Vec<Value>,
    pub arity: Arity,
}

impl Condition {
    pub fn new(template: impl Into<String>, values: Vec<Value>, arity: Arity) -> Self { Self { template: template.into(), values, arity } }

    pub fn scalar(template: impl Into<String>, value: impl Into<Value>) -> Self { Self::new(template, vec![value.into()], Arity::Scalar) }

    pub fn multi<T: Into<Value>>(template: impl Into<String>, values: impl IntoIterator<Item = T>) -> Self {
        Self::new(template, values.into_iter().map(Into::into).collect(), Arity::Multi)
    }
}

/// Conditions that all restrict the same association target.
/// An empty group still requests the association to be loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateGroup {
    pub association: String,
    pub conditions: Vec<Condition>,
}

impl PredicateGroup {
    pub fn new(association: impl Into<String>) -> Self { Self { association: association.into(), conditions: Vec::new() } }

    pub fn push(&mut self, condition: Condition) { self.conditions.push(condition); }

    pub fn is_empty(&self) -> bool { self.conditions.is_empty() }
}

/// One eager-load instruction for the executor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EagerLoad<'p> {
    Unconditional(&'p str),
    Restricted(&'p str, &'p [Condition]),
}

impl<'p> EagerLoad<'p> {
    pub fn path(&self) -> &'p str {
        match self {
            EagerLoad::Unconditional(path) | EagerLoad::Restricted(path, _) => path,
        }
    }

    pub fn conditions(&self) -> &'p [Condition] {
        match self {
            EagerLoad::Unconditional(_) => &[],
            EagerLoad::Restricted(_, conditions) => conditions,
        }
    }
}

/// Everything the executor needs for one request: AND-combined root conditions
/// plus one predicate group per association path to load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPlan {
    root: Vec<Condition>,
    associations: IndexMap<String, PredicateGroup>,
}

impl QueryPlan {
    pub fn builder() -> QueryPlanBuilder { QueryPlanBuilder::default() }

    pub fn root(&self) -> &[Condition] { &self.root }

    pub fn associations(&self) -> &IndexMap<String, PredicateGroup> { &self.associations }

    pub fn group(&self, path: &str) -> Option<&PredicateGroup> { self.associations.get(path) }

    /// Load instructions in the order the paths were first declared
    pub fn eager_loads(&self) -> impl Iterator<Item = EagerLoad<'_>> {
        self.associations.iter().map(|(path, group)| {
            if group.is_empty() {
                EagerLoad::Unconditional(path.as_str())
            } else {
                EagerLoad::Restricted(path.as_str(), group.conditions.as_slice())
            }
        })
    }
}

#[derive(Debug, Default)]
pub struct QueryPlanBuilder {
    root: Vec<Condition>,
    associations: IndexMap<String, PredicateGroup>,
}

impl QueryPlanBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn root(&mut self, condition: Condition) -> &mut Self {
        self.root.push(condition);
        self
    }

    /// Request an association without restricting it
    pub fn eager_load(&mut self, path: impl Into<String>) -> &mut Self {
        let path = path.into();
        if path.is_empty() {
            warn!("ignoring eager load of the root entity");
            return self;
        }
        self.associations.entry(path.clone()).or_insert_with(|| PredicateGroup::new(path));
        self
    }

    pub fn restrict(&mut self, path: impl Into<String>, condition: Condition) -> &mut Self {
        let path = path.into();
        if path.is_empty() {
            return self.root(condition);
        }
        self.associations.entry(path.clone()).or_insert_with(|| PredicateGroup::new(path)).push(condition);
        self
    }

    /// Append collected conditions. Groups for a path already present are extended.
    pub fn conditions(&mut self, conditions: Conditions) -> &mut Self {
        self.root.extend(conditions.root);
        for (path, group) in conditions.groups {
            if path.is_empty() {
                warn!("predicate group keyed by the root path; moving its conditions to the root");
                self.root.extend(group.conditions);
                continue;
            }
            match self.associations.get_mut(&path) {
                Some(existing) => existing.conditions.extend(group.conditions),
                None => {
                    self.associations.insert(path, group);
                }
            }
        }
        self
    }

    /// Request every association reachable from `entity`
    pub fn eager_load_all(&mut self, catalog: &Catalog, entity: &str) -> &mut Self {
        for path in catalog.association_paths(entity) {
            self.eager_load(path);
        }
        self
    }

    pub fn build(&mut self) -> QueryPlan {
        QueryPlan { root: std::mem::take(&mut self.root), associations: std::mem::take(&mut self.associations) }
    }
}

/// Turn grouped conditions into a plan
pub fn build(conditions: Conditions) -> QueryPlan { QueryPlanBuilder::new().conditions(conditions).build() }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::PredicateGroup;

    #[test]
    fn test_empty_group_is_unconditional() {
        let mut conditions = Conditions::default();
        conditions.groups.insert("Devices".into(), PredicateGroup::new("Devices"));
        let mut groups = PredicateGroup::new("Groups");
        groups.push(Condition::multi("groups.name IN (?)", ["admin"]));
        conditions.groups.insert("Groups".into(), groups);

        let plan = build(conditions);
        let loads: Vec<_> = plan.eager_loads().collect();
        assert_eq!(loads[0], EagerLoad::Unconditional("Devices"));
        assert_eq!(loads[1].path(), "Groups");
        assert_eq!(loads[1].conditions(), &[Condition::multi("groups.name IN (?)", ["admin"])]);
    }

    #[test]
    fn test_root_keyed_group_moves_to_root() {
        let mut conditions = Conditions::default();
        let mut group = PredicateGroup::new("");
        group.push(Condition::scalar("users.name = ?", "Alice"));
        conditions.groups.insert("".into(), group);

        let plan = build(conditions);
        assert!(plan.associations().is_empty());
        assert_eq!(plan.root(), &[Condition::scalar("users.name = ?", "Alice")]);
    }

    #[test]
    fn test_restrict_after_eager_load_keeps_single_group() {
        let plan =
            QueryPlan::builder().eager_load("Groups").restrict("Groups", Condition::multi("name IN (?)", ["admin"])).eager_load("Groups").build();
        assert_eq!(plan.associations().len(), 1);
        assert_eq!(plan.group("Groups").map(|g| g.conditions.len()), Some(1));
    }

    #[test]
    fn test_restrict_root_path() {
        let plan = QueryPlan::builder().restrict("", Condition::scalar("users.id = ?", 1i64)).build();
        assert_eq!(plan.root().len(), 1);
        assert!(plan.associations().is_empty());
    }
}
