//! Query builder utilities
//!
//! This module provides the query specification and MySQL statement generation.

pub mod aggregation;
pub mod builder;
pub mod filter;
pub mod grouping;
pub mod join;
pub mod ordering;
pub mod pagination;
pub mod sql_generation;

#[cfg(test)]
mod tests;

pub use aggregation::{AggregateFunction, SelectField};
pub use builder::QuerySpec;
pub use filter::{Filters, LogicalOperator, QueryCondition, QueryFilter, QueryOperator};
pub use grouping::GroupBy;
pub use join::{Join, JoinClause, JoinCondition, JoinType};
pub use ordering::{OrderBy, SortOrder};
pub use pagination::{Page, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
pub use sql_generation::{SqlGenerator, Statement};
