//! Type mapping definitions
//!
//! This module provides the Rust to MySQL value mapping used for
//! out-of-band parameter binding.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column name to value mapping, used for UPDATE data and INSERT rows.
///
/// A sorted map keeps the generated column order stable between calls.
pub type Values = BTreeMap<String, SqlValue>;

/// A value that can be bound to a MySQL statement parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    Json(serde_json::Value),
    /// Expanded into `(?, ?, ...)` when bound into an IN list
    List(Vec<SqlValue>),
}

impl SqlValue {
    /// Convert a JSON value into a bind value.
    ///
    /// Strings holding RFC3339 timestamps become `Timestamp` (normalized to UTC),
    /// arrays become `List` and objects are kept as `Json`.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => SqlValue::Null,
            serde_json::Value::Bool(b) => SqlValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqlValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    SqlValue::UInt(u)
                } else if let Some(f) = n.as_f64() {
                    SqlValue::Float(f)
                } else {
                    SqlValue::Text(n.to_string())
                }
            }
            serde_json::Value::String(s) => match DateTime::parse_from_rfc3339(&s) {
                Ok(dt) => SqlValue::Timestamp(dt.with_timezone(&Utc).naive_utc()),
                Err(_) => SqlValue::Text(s),
            },
            serde_json::Value::Array(items) => {
                SqlValue::List(items.into_iter().map(SqlValue::from_json).collect())
            }
            other @ serde_json::Value::Object(_) => SqlValue::Json(other),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, SqlValue::List(_))
    }

    /// Number of bind parameters this value occupies
    pub fn placeholder_count(&self) -> usize {
        match self {
            SqlValue::List(items) => items.len(),
            _ => 1,
        }
    }

    /// JSON rendering, used when a list is written to a column instead of an IN list
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            SqlValue::Null => serde_json::Value::Null,
            SqlValue::Bool(b) => serde_json::Value::Bool(*b),
            SqlValue::Int(i) => serde_json::Value::from(*i),
            SqlValue::UInt(u) => serde_json::Value::from(*u),
            SqlValue::Float(f) => serde_json::Value::from(*f),
            SqlValue::Text(s) => serde_json::Value::String(s.clone()),
            SqlValue::Bytes(b) => serde_json::Value::from(b.clone()),
            SqlValue::Timestamp(ts) => serde_json::Value::String(ts.to_string()),
            SqlValue::Date(d) => serde_json::Value::String(d.to_string()),
            SqlValue::Json(v) => v.clone(),
            SqlValue::List(items) => {
                serde_json::Value::Array(items.iter().map(SqlValue::to_json).collect())
            }
        }
    }

    /// Short type label used in log output
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "bool",
            SqlValue::Int(_) => "int",
            SqlValue::UInt(_) => "uint",
            SqlValue::Float(_) => "float",
            SqlValue::Text(_) => "text",
            SqlValue::Bytes(_) => "bytes",
            SqlValue::Timestamp(_) => "timestamp",
            SqlValue::Date(_) => "date",
            SqlValue::Json(_) => "json",
            SqlValue::List(_) => "list",
        }
    }
}

impl From<String> for SqlValue {
    fn from(val: String) -> Self {
        SqlValue::Text(val)
    }
}

impl From<&str> for SqlValue {
    fn from(val: &str) -> Self {
        SqlValue::Text(val.to_string())
    }
}

impl From<&String> for SqlValue {
    fn from(val: &String) -> Self {
        SqlValue::Text(val.clone())
    }
}

impl From<bool> for SqlValue {
    fn from(val: bool) -> Self {
        SqlValue::Bool(val)
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for SqlValue {
            fn from(val: $t) -> Self {
                SqlValue::Int(val as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for SqlValue {
            fn from(val: $t) -> Self {
                SqlValue::UInt(val as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

impl From<f32> for SqlValue {
    fn from(val: f32) -> Self {
        SqlValue::Float(val as f64)
    }
}

impl From<f64> for SqlValue {
    fn from(val: f64) -> Self {
        SqlValue::Float(val)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(val: NaiveDateTime) -> Self {
        SqlValue::Timestamp(val)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(val: NaiveDate) -> Self {
        SqlValue::Date(val)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(val: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(val.naive_utc())
    }
}

impl From<serde_json::Value> for SqlValue {
    fn from(val: serde_json::Value) -> Self {
        SqlValue::from_json(val)
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(val: Option<T>) -> Self {
        match val {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

impl<T> From<Vec<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(val: Vec<T>) -> Self {
        SqlValue::List(val.into_iter().map(Into::into).collect())
    }
}
