use crate::value::{Value, Values};
use derive_more::{Deref, IntoIterator};

///
/// Row
/// One result row keyed by column name, in result-column order.
///

#[derive(Clone, Debug, Default, Deref, IntoIterator, PartialEq)]
pub struct Row(Values);

impl Row {
    pub(crate) fn from_sql(columns: &[String], row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        let mut values = Values::new();

        for (idx, name) in columns.iter().enumerate() {
            values.set(name.as_str(), row.get::<_, Value>(idx)?);
        }

        Ok(Self(values))
    }

    #[must_use]
    pub fn into_values(self) -> Values {
        self.0
    }
}

impl From<Values> for Row {
    fn from(values: Values) -> Self {
        Self(values)
    }
}
