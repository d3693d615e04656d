//! Table Store - core data-access layer for relstore
//!
//! This crate provides the connection registry, the per-table generic store,
//! query specification and SQL generation, transactions and error classification.

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod classify;
pub mod dsn;
pub mod errors;
pub mod generic_store;
pub mod prelude;
pub mod query_builder;
pub mod registry;
pub mod transaction;
pub mod validation;

pub use classify::{is_unique_violation, is_unique_violation_with, normalize, DEFAULT_UNIQUE_MARKER};
pub use dsn::Dsn;
pub use errors::{StoreError, StoreResult};
pub use generic_store::TableStore;
pub use query_builder::{
    Filters, GroupBy, Join, JoinClause, JoinType, Page, QueryFilter, QueryOperator, QuerySpec,
    SortOrder,
};
pub use registry::{ConnectionHandle, ConnectionRegistry, PoolLimits};
pub use transaction::Tx;
pub use validation::{ValidatedFieldName, ValidatedTableName, ValidationError};

pub type DbPool = sqlx::MySqlPool;
