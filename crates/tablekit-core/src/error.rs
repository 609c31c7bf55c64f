use crate::validate::IdentifierIssue;
use derive_more::Display;
use rusqlite::ErrorCode;
use std::path::PathBuf;
use thiserror::Error as ThisError;

///
/// Error
///
/// Every failure surfaced by schema registration and table handles.
/// Engine failures propagate unchanged; the handle never retries.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("constraint violation: {0}")]
    Constraint(#[source] rusqlite::Error),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("engine error: {0}")]
    Engine(#[source] rusqlite::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Schema(_) => ErrorClass::Schema,
            Self::Connection(_) => ErrorClass::Connection,
            Self::Constraint(_) => ErrorClass::Constraint,
            Self::Query(_) => ErrorClass::Query,
            Self::Engine(_) => ErrorClass::Engine,
            Self::Config(_) => ErrorClass::Config,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}: {self}", self.class())
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Connection(ConnectionError::Closed { .. }))
    }

    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::Connection(ConnectionError::Busy { .. }))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Self::Constraint(err)
            }
            _ => Self::Engine(err),
        }
    }
}

///
/// SchemaError
///
/// Raised while turning declared fields into a `TableSchema`, or while
/// binding a schema to its declaring type.
///

#[derive(Debug, ThisError)]
pub enum SchemaError {
    #[error("invalid identifier '{name}': {issue}")]
    InvalidIdentifier { name: String, issue: IdentifierIssue },

    #[error("invalid type declaration '{decl}' for field '{field}'")]
    InvalidTypeDecl { field: String, decl: String },

    #[error("duplicate field '{field}' in table '{table}'")]
    DuplicateField { table: String, field: String },

    #[error("table '{table}' is declared by both '{first}' and '{second}'")]
    DuplicateTable {
        table: String,
        first: String,
        second: String,
    },
}

///
/// ConnectionError
///

#[derive(Debug, ThisError)]
pub enum ConnectionError {
    #[error("connection for table '{table}' is closed")]
    Closed { table: String },

    #[error("handle for table '{table}' is already borrowed; drop the other guard first")]
    Busy { table: String },

    #[error("failed to open database '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
}

///
/// QueryError
///
/// Operation-shape problems caught before any SQL reaches the engine.
///

#[derive(Debug, ThisError)]
pub enum QueryError {
    #[error("delete on '{table}' has no filters; use delete_all to clear the table")]
    UnfilteredDelete { table: String },

    #[error("update on '{table}' has no filters")]
    UnfilteredUpdate { table: String },

    #[error("update on '{table}' assigns no values")]
    EmptyAssignment { table: String },
}

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// ErrorClass
/// Coarse taxonomy for callers that branch on the kind of failure.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[remain::sorted]
pub enum ErrorClass {
    #[display("config")]
    Config,
    #[display("connection")]
    Connection,
    #[display("constraint")]
    Constraint,
    #[display("engine")]
    Engine,
    #[display("query")]
    Query,
    #[display("schema")]
    Schema,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::ffi;

    fn sqlite_failure(code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), None)
    }

    #[test]
    fn constraint_failures_are_classified_separately() {
        let err = Error::from(sqlite_failure(ffi::SQLITE_CONSTRAINT_PRIMARYKEY));
        assert_eq!(err.class(), ErrorClass::Constraint);

        let err = Error::from(sqlite_failure(ffi::SQLITE_ERROR));
        assert_eq!(err.class(), ErrorClass::Engine);
    }

    #[test]
    fn display_with_class_prefixes_label() {
        let err = Error::from(QueryError::UnfilteredDelete {
            table: "user".into(),
        });

        assert_eq!(
            err.display_with_class(),
            "query: delete on 'user' has no filters; use delete_all to clear the table"
        );
    }

    #[test]
    fn closed_is_detected() {
        let err = Error::from(ConnectionError::Closed {
            table: "user".into(),
        });

        assert!(err.is_closed());
        assert_eq!(err.class(), ErrorClass::Connection);
    }

    #[test]
    fn busy_is_a_connection_error() {
        let err = Error::from(ConnectionError::Busy {
            table: "user".into(),
        });

        assert!(err.is_busy());
        assert!(!err.is_closed());
        assert_eq!(err.class(), ErrorClass::Connection);
    }
}
