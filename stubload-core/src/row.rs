//! Loosely typed rows as they come back from the source store.
//!
//! A [CandidateRow] keeps the columns in the order the store returned them. Typed access goes
//! through the `required_*`/`optional_*` accessors, which turn an absent, null or wrongly typed
//! column into a [ValidationError] naming the column.
use std::fmt;

use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::ValidationError;

/// One raw column value. SQL NULL is not a variant, it is the absence of a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnValue {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Boolean(bool),
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        ColumnValue::Text(value.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        ColumnValue::Text(value)
    }
}

impl From<i64> for ColumnValue {
    fn from(value: i64) -> Self {
        ColumnValue::Integer(value)
    }
}

impl From<i32> for ColumnValue {
    fn from(value: i32) -> Self {
        ColumnValue::Integer(value.into())
    }
}

impl From<Decimal> for ColumnValue {
    fn from(value: Decimal) -> Self {
        ColumnValue::Decimal(value)
    }
}

impl From<bool> for ColumnValue {
    fn from(value: bool) -> Self {
        ColumnValue::Boolean(value)
    }
}

/// Identity of a source row, used to acknowledge it once published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StubId(i32);

impl StubId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for StubId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An unprocessed source record, read-only once fetched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateRow {
    columns: Vec<(String, Option<ColumnValue>)>,
}

impl CandidateRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column. Lookups return the first column with a matching name.
    pub fn push(&mut self, column: impl Into<String>, value: Option<ColumnValue>) {
        self.columns.push((column.into(), value));
    }

    /// Builder-style [CandidateRow::push] for a non-null value.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        self.push(column, Some(value.into()));
        self
    }

    /// Builder-style [CandidateRow::push] for a SQL NULL.
    pub fn with_null(mut self, column: impl Into<String>) -> Self {
        self.push(column, None);
        self
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the value of `column`, `None` when the column is absent or NULL.
    pub fn get(&self, column: &str) -> Option<&ColumnValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Returns a copy of this row without `column`.
    pub fn without(&self, column: &str) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .filter(|(name, _)| name != column)
                .cloned()
                .collect(),
        }
    }

    /// Returns a copy of this row with `column` replaced (or appended).
    pub fn replaced(&self, column: &str, value: Option<ColumnValue>) -> Self {
        let mut row = self.without(column);
        row.push(column, value);
        row
    }

    /// A mandatory, non-blank text column.
    pub fn required_text(&self, column: &'static str) -> Result<String, ValidationError> {
        match self.get(column) {
            Some(ColumnValue::Text(value)) if !value.trim().is_empty() => Ok(value.clone()),
            _ => Err(ValidationError::MissingData { column }),
        }
    }

    /// An optional text column. Blank text is treated the same as NULL.
    pub fn optional_text(&self, column: &'static str) -> Result<Option<String>, ValidationError> {
        match self.get(column) {
            None => Ok(None),
            Some(ColumnValue::Text(value)) if value.trim().is_empty() => Ok(None),
            Some(ColumnValue::Text(value)) => Ok(Some(value.clone())),
            Some(_) => Err(ValidationError::MissingData { column }),
        }
    }

    pub fn required_i32(&self, column: &'static str) -> Result<i32, ValidationError> {
        match self.get(column) {
            Some(ColumnValue::Integer(value)) => {
                i32::try_from(*value).map_err(|_| ValidationError::MissingData { column })
            }
            _ => Err(ValidationError::MissingData { column }),
        }
    }

    pub fn required_decimal(&self, column: &'static str) -> Result<Decimal, ValidationError> {
        match self.get(column) {
            Some(ColumnValue::Decimal(value)) => Ok(*value),
            _ => Err(ValidationError::MissingData { column }),
        }
    }

    pub fn required_bool(&self, column: &'static str) -> Result<bool, ValidationError> {
        match self.get(column) {
            Some(ColumnValue::Boolean(value)) => Ok(*value),
            _ => Err(ValidationError::MissingData { column }),
        }
    }

    /// JSON rendering of the whole row, attached to failure reports.
    pub fn snapshot(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("{self:?} (unserializable: {e})"))
    }
}

impl Serialize for CandidateRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
