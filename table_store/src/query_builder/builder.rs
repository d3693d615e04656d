//! Query specification
//!
//! A [`QuerySpec`] is plain data: filters, ordering, paging, projection, join and
//! grouping. Nothing is validated until [`SqlGenerator`] renders it.
//!
//! [`SqlGenerator`]: crate::query_builder::SqlGenerator

use crate::query_builder::filter::{Filters, QueryFilter};
use crate::query_builder::grouping::GroupBy;
use crate::query_builder::join::Join;
use crate::query_builder::pagination::Page;
use type_mapping::SqlValue;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    pub filters: Filters,
    pub conditions: Vec<QueryFilter>,
    pub order_by: Vec<String>,
    pub fields: Vec<String>,
    pub join: Option<Join>,
    pub group_by: Option<GroupBy>,
    pub page: Option<Page>,
    pub limit: Option<u64>,
    pub distinct: bool,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the flat filter mapping
    pub fn filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Add one flat filter entry
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.filters.insert(key, value);
        self
    }

    /// Add a typed condition (combined with AND)
    pub fn condition(mut self, filter: QueryFilter) -> Self {
        self.conditions.push(filter);
        self
    }

    /// Add ordering, e.g. `"created_at DESC"`
    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.order_by.push(expr.into());
        self
    }

    pub fn order_by_all<S: AsRef<str>>(mut self, exprs: &[S]) -> Self {
        self.order_by
            .extend(exprs.iter().map(|e| e.as_ref().to_string()));
        self
    }

    /// Projection list; an entry may hold several comma-separated items
    pub fn fields<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.fields
            .extend(fields.iter().map(|f| f.as_ref().to_string()));
        self
    }

    pub fn join(mut self, join: impl Into<Join>) -> Self {
        self.join = Some(join.into());
        self
    }

    pub fn group_by(mut self, group_by: impl Into<GroupBy>) -> Self {
        self.group_by = Some(group_by.into());
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }

    /// Row limit without offset; ignored when a page is set
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Same filter set and join, without ordering, paging or projection
    pub fn for_count(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            conditions: self.conditions.clone(),
            join: self.join.clone(),
            ..Self::default()
        }
    }
}
