//! Error classification
//!
//! Maps driver error signatures onto the store taxonomy. Unique-key conflicts are
//! recognized from the structured MySQL error code when the driver exposes one, and
//! from the error text otherwise.

use crate::errors::{StoreError, StoreResult};
use std::fmt::Display;

/// Text MySQL reports for a duplicate key, as rendered by the driver (`<code> (<sqlstate>)`)
pub const DEFAULT_UNIQUE_MARKER: &str = "1062 (23000)";

/// Classify a driver error
pub fn classify_sqlx(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            StoreError::ConstraintViolation(err)
        }
        other if is_unique_violation(Some(&other)) => StoreError::ConstraintViolation(other),
        other => StoreError::Engine(other),
    }
}

/// Swallow record-not-found.
///
/// `Ok(v)` becomes `Ok(Some(v))`, `NotFound` becomes `Ok(None)` and every other
/// error is returned unchanged.
pub fn normalize<T>(result: StoreResult<T>) -> StoreResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(StoreError::NotFound) => Ok(None),
        Err(err) => Err(err),
    }
}

/// True iff `err` is present and its text contains [`DEFAULT_UNIQUE_MARKER`]
pub fn is_unique_violation<E>(err: Option<&E>) -> bool
where
    E: Display + ?Sized,
{
    is_unique_violation_with(err, DEFAULT_UNIQUE_MARKER)
}

/// True iff `err` is present and its text contains `marker`
pub fn is_unique_violation_with<E>(err: Option<&E>, marker: &str) -> bool
where
    E: Display + ?Sized,
{
    match err {
        Some(err) if !marker.is_empty() => err.to_string().contains(marker),
        _ => false,
    }
}
