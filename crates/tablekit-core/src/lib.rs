//! Core runtime for tablekit: values, field descriptors, schemas, the type
//! registry, and the SQLite-backed table handle.
//!
//! ## Crate layout
//! - `model`: declared column metadata and the resolved `TableSchema`.
//! - `validate`: identifier and type-declaration allow-lists.
//! - `registry`: process-wide table-name ownership for declared types.
//! - `db`: SQL synthesis, the `TableHandle`, and per-type handle cells.
//! - `config`: database and handle configuration.
//! - `obs`: metrics events and sinks.
#![warn(unreachable_pub)]

#[macro_use]
mod macros;

pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod obs;
pub mod registry;
pub mod traits;
pub mod validate;
pub mod value;

///
/// CONSTANTS
///

/// Maximum length for table and column identifiers.
pub const MAX_IDENTIFIER_LEN: usize = 64;

// re-exports
pub use error::Error;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
///

pub mod prelude {
    pub use crate::{
        db::{Row, TableHandle},
        model::{FieldDescriptor, SchemaBuilder, TableSchema},
        traits::{Model, Objects},
        value::{Value, Values},
    };
}
