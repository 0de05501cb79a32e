use indexmap::IndexMap;
use preload_filter::{EntityDef, Value};
use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::StorageError;

/// Loaded rows of one association on one record
#[derive(Debug, Clone, PartialEq)]
pub enum Related {
    Many(Vec<Record>),
    One(Option<Box<Record>>),
}

impl Serialize for Related {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Related::Many(records) => records.serialize(serializer),
            Related::One(record) => record.serialize(serializer),
        }
    }
}

/// One loaded entity row with whatever associations were preloaded.
/// Serialises as a map keyed by catalogue field names.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub entity: &'static str,
    key: Value,
    fields: IndexMap<&'static str, Value>,
    associations: IndexMap<&'static str, Related>,
}

impl Record {
    /// Build a record from a row holding `def`'s columns in declaration order
    pub fn from_row(def: &EntityDef, row: Vec<Value>) -> Result<Self, StorageError> {
        if row.len() != def.columns.len() {
            return Err(StorageError::Decode(format!("{}: expected {} columns, got {}", def.name, def.columns.len(), row.len())));
        }
        let fields: IndexMap<_, _> = def.columns.iter().map(|column| column.field).zip(row).collect();
        let key = def
            .primary_key_column()
            .and_then(|pk| fields.get(pk.field).cloned())
            .ok_or_else(|| StorageError::Decode(format!("{}: primary key {} not selected", def.name, def.primary_key)))?;
        Ok(Self { entity: def.name, key, fields, associations: IndexMap::new() })
    }

    pub fn key(&self) -> &Value { &self.key }

    pub fn get(&self, field: &str) -> Option<&Value> { self.fields.get(field) }

    pub fn related(&self, field: &str) -> Option<&Related> { self.associations.get(field) }

    pub fn set_related(&mut self, field: &'static str, related: Related) { self.associations.insert(field, related); }

    /// Reorder loaded associations to follow `def`'s declaration order
    pub fn sort_related(&mut self, def: &EntityDef) {
        let rank = |field: &str| def.associations.iter().position(|association| association.field == field).unwrap_or(usize::MAX);
        self.associations.sort_by(|a, _, b, _| rank(*a).cmp(&rank(*b)));
    }

    /// Convert into a typed model through its serde representation
    pub fn into_entity<T: DeserializeOwned>(&self) -> Result<T, StorageError> { Ok(serde_json::from_value(serde_json::to_value(self)?)?) }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + self.associations.len()))?;
        for (field, value) in &self.fields {
            map.serialize_entry(field, value)?;
        }
        for (field, related) in &self.associations {
            map.serialize_entry(field, related)?;
        }
        map.end()
    }
}
