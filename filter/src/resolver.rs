use crate::catalog::{Association, Catalog, EntityDef};
use crate::error::ResolveError;
use crate::schema::join_path;

/// An association path and the entity it lands on
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath<'c> {
    pub path: String,
    pub entity: &'c EntityDef,
}

/// Resolves external path segments (e.g. `group`, `permission`) into canonical
/// association paths (`Groups.Permissions`) by walking the catalogue.
///
/// Matching is case-insensitive and accepts the segment either as written or with
/// a trailing `s` appended. Irregular plurals are not derived; an association can
/// list them explicitly as aliases instead.
pub struct PathResolver<'c> {
    catalog: &'c Catalog,
}

impl<'c> PathResolver<'c> {
    pub fn new(catalog: &'c Catalog) -> Self { Self { catalog } }

    pub fn resolve<S: AsRef<str>>(&self, segments: &[S], start: &str) -> Result<ResolvedPath<'c>, ResolveError> {
        let mut current = self.catalog.entity(start).ok_or_else(|| ResolveError::UnknownEntity(start.to_owned()))?;
        let mut path = String::new();

        for segment in segments {
            let segment = segment.as_ref();
            let association = match_segment(current, segment)
                .ok_or_else(|| ResolveError::NotFound { segment: segment.to_owned(), entity: current.name.to_owned() })?;
            path = join_path(&path, association.field);
            // one- and many-valued edges both continue from the target entity
            current = self.catalog.entity(association.target).ok_or_else(|| ResolveError::UnknownEntity(association.target.to_owned()))?;
        }

        Ok(ResolvedPath { path, entity: current })
    }
}

fn match_segment<'e>(entity: &'e EntityDef, segment: &str) -> Option<&'e Association> {
    if segment.is_empty() {
        return None;
    }
    let name = capitalize(segment);
    let plural = pluralize(&name);

    entity
        .associations
        .iter()
        .find(|assoc| assoc.field.eq_ignore_ascii_case(&name) || assoc.field.eq_ignore_ascii_case(&plural))
        .or_else(|| entity.associations.iter().find(|assoc| assoc.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(segment))))
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Naive pluralization: append `s` unless already present
pub fn pluralize(s: &str) -> String {
    if s.ends_with('s') {
        s.to_owned()
    } else {
        format!("{s}s")
    }
}
