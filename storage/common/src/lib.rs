//! Storage-side plan execution shared by the SQL backends.
//!
//! Backends implement [`SqlConnection`]; [`Executor`] turns a
//! [`preload_filter::QueryPlan`] into the root query plus one preload query per
//! association path and assembles the results into [`Record`]s.

pub mod ddl;
pub mod error;
pub mod executor;
pub mod record;
pub mod sql_builder;
pub mod traits;

pub use error::{SqlGenerationError, StorageError};
pub use executor::Executor;
pub use record::{Record, Related};
pub use sql_builder::{Placeholder, SqlBuilder};
pub use traits::{SqlConnection, StorageExecutor};
