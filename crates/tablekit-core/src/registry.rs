//! Process-wide table registry.
//!
//! Every record type declares its table name here, usually from a `ctor`
//! before `main`. Binding a type to its handle checks the table name is not
//! claimed by any other type.

use crate::{error::Error, error::SchemaError, model::TableSchema, traits::Model};
use std::{
    collections::BTreeMap,
    sync::{LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tracing::debug;

///
/// REGISTRY
/// table name → declaring type paths, in declaration order
///

static REGISTRY: LazyLock<RwLock<Registry>> = LazyLock::new(|| RwLock::new(Registry::new()));

fn registry_write() -> RwLockWriteGuard<'static, Registry> {
    REGISTRY.write().unwrap_or_else(PoisonError::into_inner)
}

fn registry_read() -> RwLockReadGuard<'static, Registry> {
    REGISTRY.read().unwrap_or_else(PoisonError::into_inner)
}

///
/// Registry
///

#[derive(Clone, Debug, Default)]
pub struct Registry {
    tables: BTreeMap<String, Vec<&'static str>>,
}

impl Registry {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
        }
    }

    /// Record that `path` claims `table`. Repeat declarations are ignored.
    pub fn declare(&mut self, table: &str, path: &'static str) {
        let paths = self.tables.entry(table.to_string()).or_default();
        if !paths.contains(&path) {
            paths.push(path);
        }
    }

    /// Fail if any type other than `path` claims `table`.
    pub fn check(&self, table: &str, path: &str) -> Result<(), SchemaError> {
        let other = self
            .tables
            .get(table)
            .and_then(|paths| paths.iter().find(|p| **p != path));

        match other {
            Some(first) => Err(SchemaError::DuplicateTable {
                table: table.to_string(),
                first: (*first).to_string(),
                second: path.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Declare then check, in one step.
    pub fn claim(&mut self, table: &str, path: &'static str) -> Result<(), SchemaError> {
        self.declare(table, path);
        self.check(table, path)
    }

    #[must_use]
    pub fn paths(&self, table: &str) -> &[&'static str] {
        self.tables.get(table).map_or(&[], Vec::as_slice)
    }

    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

/// Declare `M` to the global registry. Emitted by `#[model]` as a `ctor`.
pub fn declare<M: Model>() {
    registry_write().declare(&M::table_name(), M::PATH);
}

/// Build `M`'s schema and claim its table name.
pub fn register<M: Model>() -> Result<TableSchema, Error> {
    let schema = M::schema()?;
    bind(M::PATH, &schema)?;

    Ok(schema)
}

/// Claim `schema`'s table for the type at `path`. The macro-free path calls
/// this before opening a handle.
pub fn bind(path: &'static str, schema: &TableSchema) -> Result<(), SchemaError> {
    registry_write().claim(schema.table(), path)?;
    debug!(table = schema.table(), path, "table bound");

    Ok(())
}

/// Every declared table name with the type paths that claim it.
#[must_use]
pub fn registered_tables() -> Vec<(String, Vec<&'static str>)> {
    registry_read()
        .tables
        .iter()
        .map(|(table, paths)| (table.clone(), paths.clone()))
        .collect()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_declarations_are_idempotent() {
        let mut reg = Registry::new();
        reg.declare("user", "app::User");
        reg.declare("user", "app::User");

        assert_eq!(reg.paths("user"), ["app::User"]);
        assert!(reg.check("user", "app::User").is_ok());
    }

    #[test]
    fn collision_is_reported_for_either_type() {
        let mut reg = Registry::new();
        reg.declare("user", "app::User");
        reg.declare("user", "admin::User");

        let err = reg.check("user", "admin::User").unwrap_err();
        assert!(matches!(
            err,
            SchemaError::DuplicateTable { ref first, ref second, .. }
                if first == "app::User" && second == "admin::User"
        ));

        let err = reg.check("user", "app::User").unwrap_err();
        assert!(matches!(
            err,
            SchemaError::DuplicateTable { ref first, .. } if first == "admin::User"
        ));
    }

    #[test]
    fn claim_declares_late_types() {
        let mut reg = Registry::new();

        reg.claim("user", "app::User").unwrap();
        assert!(reg.claim("user", "admin::User").is_err());
        assert_eq!(reg.tables().collect::<Vec<_>>(), ["user"]);
    }

    #[test]
    fn global_bind_is_visible() {
        let schema = crate::model::SchemaBuilder::new("RegistryProbe")
            .build()
            .unwrap();

        bind("registry::tests::RegistryProbe", &schema).unwrap();

        assert!(
            registered_tables()
                .iter()
                .any(|(table, _)| table == "registryprobe")
        );
    }
}
