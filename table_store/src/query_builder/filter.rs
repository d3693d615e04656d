//! Query filters
//!
//! Two ways to express a WHERE clause live here. [`Filters`] is the flat
//! key/value mapping used by the table operations: every entry is an independent
//! condition and entries are always joined with AND. [`QueryFilter`] is the typed
//! form with explicit operators and AND/OR groups.

use crate::errors::{StoreError, StoreResult};
use crate::validation::is_valid_field_name;
use std::collections::BTreeMap;
use type_mapping::SqlValue;

/// Query condition operators
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOperator {
    Eq,        // =
    Ne,        // !=
    Gt,        // >
    Gte,       // >=
    Lt,        // <
    Lte,       // <=
    Like,      // LIKE
    In,        // IN
    NotIn,     // NOT IN
    IsNull,    // IS NULL
    IsNotNull, // IS NOT NULL
}

impl QueryOperator {
    pub fn to_sql(&self) -> &'static str {
        match self {
            QueryOperator::Eq => "=",
            QueryOperator::Ne => "!=",
            QueryOperator::Gt => ">",
            QueryOperator::Gte => ">=",
            QueryOperator::Lt => "<",
            QueryOperator::Lte => "<=",
            QueryOperator::Like => "LIKE",
            QueryOperator::In => "IN",
            QueryOperator::NotIn => "NOT IN",
            QueryOperator::IsNull => "IS NULL",
            QueryOperator::IsNotNull => "IS NOT NULL",
        }
    }
}

/// Single condition in WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCondition {
    pub field: String,
    pub operator: QueryOperator,
    pub value: Option<SqlValue>, // None for IS NULL/IS NOT NULL
}

/// Logical operators for combining conditions
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalOperator {
    And,
    Or,
}

/// Query filter that can be nested
#[derive(Debug, Clone, PartialEq)]
pub enum QueryFilter {
    Condition(QueryCondition),
    Group {
        operator: LogicalOperator,
        filters: Vec<QueryFilter>,
    },
    /// Trusted SQL fragment with one `?` per value
    Raw { sql: String, values: Vec<SqlValue> },
}

impl QueryFilter {
    /// Create a simple condition
    pub fn condition(field: &str, operator: QueryOperator, value: Option<SqlValue>) -> Self {
        Self::Condition(QueryCondition {
            field: field.to_string(),
            operator,
            value,
        })
    }

    /// Create AND group
    pub fn and(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::And,
            filters,
        }
    }

    /// Create OR group
    pub fn or(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::Or,
            filters,
        }
    }

    /// Equal condition
    pub fn eq(field: &str, value: impl Into<SqlValue>) -> Self {
        Self::condition(field, QueryOperator::Eq, Some(value.into()))
    }

    /// Not equal condition
    pub fn ne(field: &str, value: impl Into<SqlValue>) -> Self {
        Self::condition(field, QueryOperator::Ne, Some(value.into()))
    }

    /// Greater than condition
    pub fn gt(field: &str, value: impl Into<SqlValue>) -> Self {
        Self::condition(field, QueryOperator::Gt, Some(value.into()))
    }

    /// Greater than or equal condition
    pub fn gte(field: &str, value: impl Into<SqlValue>) -> Self {
        Self::condition(field, QueryOperator::Gte, Some(value.into()))
    }

    /// Less than condition
    pub fn lt(field: &str, value: impl Into<SqlValue>) -> Self {
        Self::condition(field, QueryOperator::Lt, Some(value.into()))
    }

    /// Less than or equal condition
    pub fn lte(field: &str, value: impl Into<SqlValue>) -> Self {
        Self::condition(field, QueryOperator::Lte, Some(value.into()))
    }

    /// LIKE condition
    pub fn like(field: &str, pattern: &str) -> Self {
        Self::condition(field, QueryOperator::Like, Some(SqlValue::from(pattern)))
    }

    /// IN condition
    pub fn in_values<V: Into<SqlValue>>(field: &str, values: Vec<V>) -> Self {
        Self::condition(field, QueryOperator::In, Some(SqlValue::from(values)))
    }

    /// NOT IN condition
    pub fn not_in_values<V: Into<SqlValue>>(field: &str, values: Vec<V>) -> Self {
        Self::condition(field, QueryOperator::NotIn, Some(SqlValue::from(values)))
    }

    /// IS NULL condition
    pub fn is_null(field: &str) -> Self {
        Self::condition(field, QueryOperator::IsNull, None)
    }

    /// IS NOT NULL condition
    pub fn is_not_null(field: &str) -> Self {
        Self::condition(field, QueryOperator::IsNotNull, None)
    }

    /// Raw condition; the caller is responsible for the SQL text
    pub fn raw(sql: impl Into<String>, values: Vec<SqlValue>) -> Self {
        Self::Raw {
            sql: sql.into(),
            values,
        }
    }
}

/// Flat filter mapping: condition key to value, combined with AND.
///
/// A key is either a column reference (`level`, `m.level`) compared for equality,
/// or a raw condition carrying `?` placeholders (`age > ?`, `id IN ?`). Entries are
/// kept sorted, so two mappings with the same entries always produce the same SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters(BTreeMap<String, SqlValue>);

impl Filters {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SqlValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<SqlValue> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&SqlValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SqlValue)> {
        self.0.iter()
    }

    /// Compile every entry into a typed filter
    pub fn to_query_filters(&self) -> StoreResult<Vec<QueryFilter>> {
        self.0
            .iter()
            .map(|(key, value)| compile_entry(key, value))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Filters
where
    K: Into<String>,
    V: Into<SqlValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, SqlValue>> for Filters {
    fn from(map: BTreeMap<String, SqlValue>) -> Self {
        Self(map)
    }
}

fn compile_entry(key: &str, value: &SqlValue) -> StoreResult<QueryFilter> {
    let placeholders = key.matches('?').count();

    if placeholders > 0 {
        return compile_raw(key, value, placeholders);
    }

    if is_valid_field_name(key) {
        return Ok(match value {
            SqlValue::Null => QueryFilter::is_null(key),
            SqlValue::List(_) => {
                QueryFilter::condition(key, QueryOperator::In, Some(value.clone()))
            }
            other => QueryFilter::eq(key, other.clone()),
        });
    }

    // A bare expression such as `deleted_at IS NULL` has nothing to bind
    if value.is_null() {
        return Ok(QueryFilter::raw(key.trim(), Vec::new()));
    }

    Err(StoreError::invalid_argument(format!(
        "filter key '{}' is neither a column nor a condition with '?' placeholders",
        key
    )))
}

fn compile_raw(key: &str, value: &SqlValue, placeholders: usize) -> StoreResult<QueryFilter> {
    match value {
        // `id IN ?` with a list: the single placeholder becomes `(?, ?, ...)`
        SqlValue::List(items) if placeholders == 1 => {
            let expanded = if items.is_empty() {
                "(NULL)".to_string()
            } else {
                format!("({})", vec!["?"; items.len()].join(", "))
            };
            Ok(QueryFilter::raw(key.replacen('?', &expanded, 1), items.clone()))
        }
        // `age BETWEEN ? AND ?` with one list item per placeholder
        SqlValue::List(items) if items.len() == placeholders => {
            Ok(QueryFilter::raw(key, items.clone()))
        }
        SqlValue::List(items) => Err(StoreError::invalid_argument(format!(
            "filter '{}' has {} placeholders but {} values",
            key,
            placeholders,
            items.len()
        ))),
        scalar if placeholders == 1 => Ok(QueryFilter::raw(key, vec![scalar.clone()])),
        _ => Err(StoreError::invalid_argument(format!(
            "filter '{}' has {} placeholders but a single value",
            key, placeholders
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_keys_compile_to_equality() {
        let filters = Filters::new().with("level", "gold");
        let compiled = filters.to_query_filters().unwrap();
        assert_eq!(compiled, vec![QueryFilter::eq("level", "gold")]);
    }

    #[test]
    fn test_null_and_list_values_on_columns() {
        let filters = Filters::new()
            .with("deleted_at", SqlValue::Null)
            .with("id", vec![1i64, 2, 3]);
        let compiled = filters.to_query_filters().unwrap();

        assert_eq!(compiled[0], QueryFilter::is_null("deleted_at"));
        assert_eq!(compiled[1], QueryFilter::in_values("id", vec![1i64, 2, 3]));
    }

    #[test]
    fn test_raw_key_with_single_placeholder() {
        let filters = Filters::new().with("age > ?", 18);
        let compiled = filters.to_query_filters().unwrap();
        assert_eq!(
            compiled,
            vec![QueryFilter::raw("age > ?", vec![SqlValue::Int(18)])]
        );
    }

    #[test]
    fn test_raw_key_with_list_expands_placeholder() {
        let filters = Filters::new().with("id IN ?", vec![4i64, 5]);
        let compiled = filters.to_query_filters().unwrap();
        assert_eq!(
            compiled,
            vec![QueryFilter::raw(
                "id IN (?, ?)",
                vec![SqlValue::Int(4), SqlValue::Int(5)]
            )]
        );

        let empty = Filters::new().with("id IN ?", Vec::<i64>::new());
        assert_eq!(
            empty.to_query_filters().unwrap(),
            vec![QueryFilter::raw("id IN (NULL)", vec![])]
        );
    }

    #[test]
    fn test_raw_key_with_positional_list() {
        let filters = Filters::new().with("age BETWEEN ? AND ?", vec![18i64, 30]);
        let compiled = filters.to_query_filters().unwrap();
        assert_eq!(
            compiled,
            vec![QueryFilter::raw(
                "age BETWEEN ? AND ?",
                vec![SqlValue::Int(18), SqlValue::Int(30)]
            )]
        );
    }

    #[test]
    fn test_placeholder_mismatch_is_rejected() {
        let filters = Filters::new().with("age BETWEEN ? AND ?", 18);
        assert!(matches!(
            filters.to_query_filters(),
            Err(StoreError::InvalidArgument(_))
        ));

        let filters = Filters::new().with("a = ? OR b = ? OR c = ?", vec![1i64, 2]);
        assert!(matches!(
            filters.to_query_filters(),
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_bare_expression_needs_null_value() {
        let ok = Filters::new().with("deleted_at IS NULL", SqlValue::Null);
        assert_eq!(
            ok.to_query_filters().unwrap(),
            vec![QueryFilter::raw("deleted_at IS NULL", vec![])]
        );

        let bad = Filters::new().with("level = 'gold' OR 1", 1);
        assert!(matches!(
            bad.to_query_filters(),
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_entry_order_does_not_matter() {
        let a = Filters::new().with("b", 2).with("a", 1);
        let b: Filters = vec![("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.to_query_filters().unwrap(), b.to_query_filters().unwrap());
    }
}
