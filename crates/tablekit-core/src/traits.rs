use crate::{
    db::{ModelCell, TableHandle},
    error::{Error, SchemaError},
    model::{FieldDescriptor, SchemaBuilder, TableSchema, table_name},
};
use std::sync::MutexGuard;

///
/// Objects
/// exclusive access to a record type's handle for the duration of the guard
///

pub type Objects = MutexGuard<'static, TableHandle>;

///
/// Model
///
/// A record type bound to one table. Implemented by `#[model]`; can also be
/// implemented by hand with a `static` `ModelCell`.
///

pub trait Model: Sized + 'static {
    /// Fully qualified type path, used to tell colliding types apart.
    const PATH: &'static str;

    /// Bare type name; the table name is derived from it.
    const NAME: &'static str;

    /// Declared fields in declaration order.
    fn fields() -> Vec<(&'static str, FieldDescriptor)>;

    fn cell() -> &'static ModelCell;

    #[must_use]
    fn table_name() -> String {
        table_name(Self::NAME)
    }

    fn schema() -> Result<TableSchema, SchemaError> {
        SchemaBuilder::new(Self::NAME).fields(Self::fields()).build()
    }

    /// The type's handle, registering and opening it on first use.
    fn objects() -> Result<Objects, Error> {
        Self::cell().get_or_register::<Self>()
    }
}
