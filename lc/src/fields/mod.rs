//! Filter field schema and default filter values
//!
//! Filter forms are described by a tree of [`FieldDescriptor`]s. The
//! controller only needs the schema to compute the initial filter values;
//! rendering the fields is someone else's job.

mod defaults;
mod path;
mod schema;

pub use defaults::{resolve_defaults, resolve_initial_filter_data};
pub use path::{create, deep_merge, get, is_truthy, set};
pub use schema::{DefaultValue, FieldDescriptor, FieldType, Hidden, SchemaError, deep_flat, load_fields};
