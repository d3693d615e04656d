//! Serialization utilities
//!
//! This module converts serializable records into column/value rows
//! ready to be bound into an INSERT statement.

use crate::types::{SqlValue, Values};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("record could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("record must serialize to a map of columns, got {0}")]
    NotAMap(&'static str),
}

/// Convert a record into a column map.
///
/// Top-level fields map to columns. Nested arrays and objects are stored as JSON
/// documents rather than expanded, so a `Vec<String>` field lands in a JSON column.
pub fn serialize_to_columns<T: Serialize + ?Sized>(record: &T) -> Result<Values, MappingError> {
    let value = serde_json::to_value(record)?;

    let map = match value {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => return Err(MappingError::NotAMap("null")),
        serde_json::Value::Bool(_) => return Err(MappingError::NotAMap("bool")),
        serde_json::Value::Number(_) => return Err(MappingError::NotAMap("number")),
        serde_json::Value::String(_) => return Err(MappingError::NotAMap("string")),
        serde_json::Value::Array(_) => return Err(MappingError::NotAMap("array")),
    };

    let mut columns = Values::new();
    for (key, value) in map {
        let column_value = match value {
            nested @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                SqlValue::Json(nested)
            }
            scalar => SqlValue::from_json(scalar),
        };
        columns.insert(key, column_value);
    }

    Ok(columns)
}
