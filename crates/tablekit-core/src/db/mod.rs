//! Table handles and the SQL they execute.

mod cell;
mod handle;
mod row;
pub mod sql;

pub use cell::ModelCell;
pub use handle::TableHandle;
pub use row::Row;
