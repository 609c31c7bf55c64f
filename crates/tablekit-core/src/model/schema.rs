use crate::{
    error::SchemaError,
    model::FieldDescriptor,
    validate::{is_valid_type_decl, validate_identifier},
    value::Value,
};

/// Derive the table name for a record type: the type name, lower-cased.
#[must_use]
pub fn table_name(type_name: &str) -> String {
    type_name.to_lowercase()
}

///
/// TableSchema
///
/// Ordered, validated column set bound to a table name. Field order is the
/// declaration order and drives `CREATE TABLE` column order. The field set
/// is fixed once built.
///

#[derive(Clone, Debug, PartialEq)]
pub struct TableSchema {
    table: String,
    fields: Vec<(String, FieldDescriptor)>,
}

impl TableSchema {
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.fields.iter().map(|(n, f)| (n.as_str(), f))
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find_map(|(n, f)| (n == name).then_some(f))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Fields that declare a default, in declaration order.
    pub fn defaults(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .filter_map(|(n, f)| f.default().map(|d| (n.as_str(), d)))
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

///
/// SchemaBuilder
///
/// Collects declared fields for one record type and resolves them into a
/// `TableSchema`. This is the macro-free registration path; `#[model]`
/// expands to the same calls.
///

#[derive(Clone, Debug)]
pub struct SchemaBuilder {
    table: String,
    fields: Vec<(String, FieldDescriptor)>,
}

impl SchemaBuilder {
    /// Start a schema for the record type `type_name`.
    #[must_use]
    pub fn new(type_name: &str) -> Self {
        Self {
            table: table_name(type_name),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.fields.push((name.into(), descriptor));
        self
    }

    #[must_use]
    pub fn fields<N, I>(mut self, fields: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, FieldDescriptor)>,
    {
        self.fields
            .extend(fields.into_iter().map(|(n, f)| (n.into(), f)));
        self
    }

    /// Validate every identifier and type declaration, then freeze.
    pub fn build(self) -> Result<TableSchema, SchemaError> {
        validate_identifier(&self.table).map_err(|issue| SchemaError::InvalidIdentifier {
            name: self.table.clone(),
            issue,
        })?;

        for (i, (name, field)) in self.fields.iter().enumerate() {
            validate_identifier(name).map_err(|issue| SchemaError::InvalidIdentifier {
                name: name.clone(),
                issue,
            })?;

            if !is_valid_type_decl(field.sql_type()) {
                return Err(SchemaError::InvalidTypeDecl {
                    field: name.clone(),
                    decl: field.sql_type().to_string(),
                });
            }

            // column names are case-insensitive in SQLite
            if self.fields[..i]
                .iter()
                .any(|(prev, _)| prev.eq_ignore_ascii_case(name))
            {
                return Err(SchemaError::DuplicateField {
                    table: self.table.clone(),
                    field: name.clone(),
                });
            }
        }

        Ok(TableSchema {
            table: self.table,
            fields: self.fields,
        })
    }
}

///
/// TESTS
///
