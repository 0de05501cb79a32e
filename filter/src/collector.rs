use indexmap::IndexMap;

use crate::plan::{Condition, PredicateGroup};
use crate::schema::{walk, FilterSpec};

/// Active conditions split into the root group and one group per association path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    pub root: Vec<Condition>,
    pub groups: IndexMap<String, PredicateGroup>,
}

impl Conditions {
    pub fn is_empty(&self) -> bool { self.root.is_empty() && self.groups.is_empty() }
}

/// Walk a populated filter and group its active conditions by association path.
///
/// A group is created the first time any descriptor for its path is visited, even
/// when that descriptor has no value, so every association the filter declares is
/// loaded. Paths are never reset once created. Within a group, conditions keep
/// descriptor declaration order.
pub fn collect(spec: &dyn FilterSpec) -> Conditions {
    let mut conditions = Conditions::default();

    walk(spec, "", &mut |path, descriptor, value| {
        if !path.is_empty() && !conditions.groups.contains_key(path) {
            conditions.groups.insert(path.to_owned(), PredicateGroup::new(path));
        }

        let Some(value) = value else { return };
        let condition = Condition::new(descriptor.template.to_string(), value.into_values(), descriptor.arity);

        match conditions.groups.get_mut(path) {
            Some(group) => group.push(condition),
            None => conditions.root.push(condition),
        }
    });

    conditions
}
