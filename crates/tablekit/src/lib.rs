//! ## Crate layout
//! - `core`: values, schemas, the registry, table handles and observability.
//! - `model`: the `#[model]` attribute that binds a struct to a table.
//! - `config`: database and handle configuration, installed process-wide.
//! - `obs`: per-thread operation counters and metrics sinks.
//!
//! ```ignore
//! use tablekit::prelude::*;
//!
//! #[model]
//! pub struct User {
//!     #[field(sql = "INTEGER PRIMARY KEY AUTOINCREMENT")]
//!     id: i64,
//!     #[field(sql = "INTEGER")]
//!     age: i64,
//!     #[field(sql = "VARCHAR(30)", default = "")]
//!     first_name: String,
//! }
//!
//! let mut users = User::objects()?;
//! users.insert(&values! { first_name: "John", age: 10 })?;
//! users.update(&values! { first_name: "John" }, &values! { age: 11 })?;
//! users.save_changes()?;
//! ```

pub use tablekit_core as core;
pub use tablekit_derive::model;

// export so the generated paths resolve inside this crate too
extern crate self as tablekit;

/// re-exports
///
/// macros can use these, stops the user having to specify all the dependencies
/// in the Cargo.toml file manually
#[doc(hidden)]
pub mod __reexports {
    pub use ctor;
}

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use core::{
    Error, config, obs,
    traits::{Model, Objects},
    values,
};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        core::{
            db::{Row, TableHandle},
            model::{FieldDescriptor, SchemaBuilder, TableSchema},
            traits::{Model as _, Objects},
            value::{Value, Values},
        },
        model, values,
    };
}
