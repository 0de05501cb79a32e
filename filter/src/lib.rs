//! Filter-to-query compiler.
//!
//! Filter types declare a static table of [`schema::FieldDescriptor`]s. At request
//! time [`collector::collect`] walks a populated filter and groups its active
//! conditions by association path, and [`plan::build`] turns those groups into a
//! [`plan::QueryPlan`]: root conditions plus one eager-load instruction per
//! association. Raw parameter names can be bound without a declared filter through
//! [`dynamic::DynamicBinding`], which resolves path segments against the
//! [`catalog::Catalog`] with [`resolver::PathResolver`].
//!
//! Nothing here knows about SQL dialects or a storage engine; templates are passed
//! through to the executor untouched.

pub mod catalog;
pub mod collector;
pub mod dynamic;
pub mod error;
pub mod plan;
pub mod resolver;
pub mod schema;
pub mod value;

pub use catalog::{Association, Cardinality, Catalog, Column, EntityDef, Link};
pub use collector::{collect, Conditions};
pub use dynamic::DynamicBinding;
pub use error::{FilterError, ResolveError, SchemaError};
pub use plan::{build, Condition, EagerLoad, PredicateGroup, QueryPlan, QueryPlanBuilder};
pub use resolver::{PathResolver, ResolvedPath};
pub use schema::{Arity, DynamicFilter, FieldDescriptor, FilterField, FilterSpec};
pub use value::{ColumnKind, FilterValue, Value};
