//! Runtime data model definitions.
//!
//! - `field` holds what a caller declares per column
//! - `schema` holds the resolved, validated, ordered column set

pub mod field;
pub mod schema;

pub use field::FieldDescriptor;
pub use schema::{SchemaBuilder, TableSchema, table_name};
