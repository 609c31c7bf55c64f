//! SQL synthesis.
//!
//! Identifiers are interpolated after passing the allow-list; every value is
//! a `?` placeholder with a matching entry in `Statement::params`.

use crate::{
    error::SchemaError,
    model::TableSchema,
    validate::validate_identifier,
    value::{Value, Values},
};

///
/// Statement
/// SQL text plus its positional parameters, in placeholder order.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    const fn new(sql: String, params: Vec<Value>) -> Self {
        Self { sql, params }
    }

    #[must_use]
    pub fn placeholders(&self) -> usize {
        self.sql.matches('?').count()
    }
}

/// `CREATE TABLE IF NOT EXISTS <table> (<col> <type>, ...)` in declaration order.
#[must_use]
pub fn create_table(schema: &TableSchema) -> String {
    let columns = schema
        .fields()
        .map(|(name, field)| {
            if field.sql_type().is_empty() {
                name.to_string()
            } else {
                format!("{name} {}", field.sql_type())
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!("CREATE TABLE IF NOT EXISTS {} ({columns})", schema.table())
}

/// `DROP TABLE IF EXISTS <table>`.
#[must_use]
pub fn drop_table(schema: &TableSchema) -> String {
    format!("DROP TABLE IF EXISTS {}", schema.table())
}

/// `INSERT INTO <table> (<names>) VALUES (?, ...)`.
///
/// Supplied values come first in supplied order, followed by every schema
/// default whose field was not supplied.
pub fn insert(schema: &TableSchema, values: &Values) -> Result<Statement, SchemaError> {
    check_names(values)?;

    let mut names: Vec<&str> = Vec::with_capacity(values.len());
    let mut params: Vec<Value> = Vec::with_capacity(values.len());

    for (name, value) in values.iter() {
        names.push(name);
        params.push(value.clone());
    }
    for (name, default) in schema.defaults() {
        if !values.contains(name) {
            names.push(name);
            params.push(default.clone());
        }
    }

    if names.is_empty() {
        return Ok(Statement::new(
            format!("INSERT INTO {} DEFAULT VALUES", schema.table()),
            params,
        ));
    }

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema.table(),
        names.join(", "),
        vec!["?"; names.len()].join(", "),
    );

    Ok(Statement::new(sql, params))
}

/// `DELETE FROM <table> [WHERE f1 = ? AND ...]`.
pub fn delete(schema: &TableSchema, filters: &Values) -> Result<Statement, SchemaError> {
    check_names(filters)?;

    let sql = format!("DELETE FROM {}{}", schema.table(), where_clause(filters));

    Ok(Statement::new(sql, filters.values().cloned().collect()))
}

/// `UPDATE <table> SET k1 = ?, ... [WHERE f1 = ? AND ...]`.
///
/// Assignment parameters are bound before filter parameters.
pub fn update(
    schema: &TableSchema,
    filters: &Values,
    values: &Values,
) -> Result<Statement, SchemaError> {
    check_names(values)?;
    check_names(filters)?;

    let assignments = values
        .names()
        .map(|name| format!("{name} = ?"))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "UPDATE {} SET {assignments}{}",
        schema.table(),
        where_clause(filters)
    );
    let params = values.values().chain(filters.values()).cloned().collect();

    Ok(Statement::new(sql, params))
}

/// `SELECT * FROM <table> [WHERE ...] ORDER BY rowid`.
pub fn select(schema: &TableSchema, filters: &Values) -> Result<Statement, SchemaError> {
    check_names(filters)?;

    let sql = format!(
        "SELECT * FROM {}{} ORDER BY rowid",
        schema.table(),
        where_clause(filters)
    );

    Ok(Statement::new(sql, filters.values().cloned().collect()))
}

/// `SELECT COUNT(*) FROM <table> [WHERE ...]`.
pub fn count(schema: &TableSchema, filters: &Values) -> Result<Statement, SchemaError> {
    check_names(filters)?;

    let sql = format!(
        "SELECT COUNT(*) FROM {}{}",
        schema.table(),
        where_clause(filters)
    );

    Ok(Statement::new(sql, filters.values().cloned().collect()))
}

fn where_clause(filters: &Values) -> String {
    if filters.is_empty() {
        return String::new();
    }

    let predicates = filters
        .names()
        .map(|name| format!("{name} = ?"))
        .collect::<Vec<_>>()
        .join(" AND ");

    format!(" WHERE {predicates}")
}

// Caller-supplied names are spliced too. They are checked against the
// allow-list only; membership in the schema is left to the engine.
fn check_names(values: &Values) -> Result<(), SchemaError> {
    for name in values.names() {
        validate_identifier(name).map_err(|issue| SchemaError::InvalidIdentifier {
            name: name.to_string(),
            issue,
        })?;
    }

    Ok(())
}

///
/// TESTS
///
