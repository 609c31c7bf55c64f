use crate::value::Value;

///
/// FieldDescriptor
/// Declared column metadata: the engine type string and an optional default.
///

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDescriptor {
    sql_type: String,
    default: Option<Value>,
}

impl FieldDescriptor {
    pub fn new(sql_type: impl Into<String>) -> Self {
        Self {
            sql_type: sql_type.into(),
            default: None,
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    #[must_use]
    pub fn sql_type(&self) -> &str {
        &self.sql_type
    }

    #[must_use]
    pub const fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}
