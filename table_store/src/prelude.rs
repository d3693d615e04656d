//! Convenience re-exports for common table-store usage

// Core store functionality
pub use crate::generic_store::TableStore;
pub use crate::registry::{ConnectionHandle, ConnectionRegistry, PoolLimits};

// Transactions
pub use crate::transaction::{self, Tx};

// Error types and classification
pub use crate::classify::{is_unique_violation, normalize};
pub use crate::errors::{StoreError, StoreResult};

// Query building
pub use crate::query_builder::{
    Filters, GroupBy, Join, JoinClause, JoinType, Page, QueryFilter, QuerySpec, SortOrder,
};

// Values
pub use type_mapping::{SqlValue, Values};

// Common external dependencies that are frequently used
pub use serde::{Deserialize, Serialize};
pub use sqlx::{FromRow, MySqlPool, Row};
