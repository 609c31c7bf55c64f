//! `#[model]`: binds a struct to a SQLite table.
//!
//! ```ignore
//! #[model]
//! pub struct User {
//!     #[field(sql = "INTEGER PRIMARY KEY AUTOINCREMENT")]
//!     id: i64,
//!     #[field(sql = "VARCHAR(30)", default = "")]
//!     first_name: String,
//!     #[field]
//!     age: i64,
//! }
//! ```
//!
//! Members marked `#[field]` are removed from the struct and become the
//! table's columns; the remaining members pass through unchanged.

use proc_macro::TokenStream;

mod field;
mod helper;
mod model;

#[proc_macro_attribute]
pub fn model(attr: TokenStream, item: TokenStream) -> TokenStream {
    model::expand(attr.into(), item.into())
        .unwrap_or_else(darling::Error::write_errors)
        .into()
}
