//! SQL generation
//!
//! Renders a [`QuerySpec`] into MySQL text with `?` placeholders. Values never
//! enter the SQL text; they are returned alongside it in bind order.

use crate::errors::{StoreError, StoreResult};
use crate::query_builder::aggregation::SelectField;
use crate::query_builder::builder::QuerySpec;
use crate::query_builder::filter::{LogicalOperator, QueryCondition, QueryFilter, QueryOperator};
use crate::query_builder::grouping::GroupBy;
use crate::query_builder::join::Join;
use crate::query_builder::ordering::OrderBy;
use crate::query_builder::pagination::Page;
use crate::validation::{ValidatedFieldName, ValidatedTableName};
use type_mapping::{SqlValue, Values};

/// SQL text plus its bind parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

pub struct SqlGenerator;

impl SqlGenerator {
    /// Build WHERE clause from the flat filters and the typed conditions
    pub fn build_where_clause(
        spec: &QuerySpec,
    ) -> StoreResult<(String, Vec<SqlValue>)> {
        let mut conditions = spec.filters.to_query_filters()?;
        conditions.extend(spec.conditions.iter().cloned());

        if conditions.is_empty() {
            return Ok((String::new(), Vec::new()));
        }

        let mut values = Vec::new();
        let conditions_sql = conditions
            .iter()
            .map(|condition| Self::build_condition_sql(condition, &mut values))
            .collect::<StoreResult<Vec<_>>>()?
            .join(" AND ");

        Ok((format!("WHERE {}", conditions_sql), values))
    }

    fn build_condition_sql(filter: &QueryFilter, values: &mut Vec<SqlValue>) -> StoreResult<String> {
        match filter {
            QueryFilter::Condition(condition) => Self::build_single_condition_sql(condition, values),
            QueryFilter::Group { operator, filters } => {
                if filters.is_empty() {
                    // Neutral element of the group
                    return Ok(match operator {
                        LogicalOperator::And => "1=1".to_string(),
                        LogicalOperator::Or => "1=0".to_string(),
                    });
                }

                let operator_str = match operator {
                    LogicalOperator::And => " AND ",
                    LogicalOperator::Or => " OR ",
                };

                let group_conditions = filters
                    .iter()
                    .map(|f| Self::build_condition_sql(f, values))
                    .collect::<StoreResult<Vec<_>>>()?
                    .join(operator_str);

                Ok(format!("({})", group_conditions))
            }
            QueryFilter::Raw { sql, values: raw_values } => {
                let placeholders = sql.matches('?').count();
                if placeholders != raw_values.len() {
                    return Err(StoreError::invalid_argument(format!(
                        "condition '{}' has {} placeholders but {} values",
                        sql,
                        placeholders,
                        raw_values.len()
                    )));
                }
                values.extend(raw_values.iter().map(Self::scalar));
                Ok(format!("({})", sql))
            }
        }
    }

    fn build_single_condition_sql(
        condition: &QueryCondition,
        values: &mut Vec<SqlValue>,
    ) -> StoreResult<String> {
        let field = Self::operand_sql(&condition.field)?;

        match (&condition.operator, &condition.value) {
            (QueryOperator::IsNull, _) | (QueryOperator::Eq, None | Some(SqlValue::Null)) => {
                Ok(format!("{} IS NULL", field))
            }
            (QueryOperator::IsNotNull, _) | (QueryOperator::Ne, None | Some(SqlValue::Null)) => {
                Ok(format!("{} IS NOT NULL", field))
            }
            (op @ (QueryOperator::In | QueryOperator::NotIn), Some(value)) => {
                let items = match value {
                    SqlValue::List(items) => items.clone(),
                    single => vec![single.clone()],
                };

                if items.is_empty() {
                    // Empty IN matches nothing, empty NOT IN matches everything
                    return Ok(match op {
                        QueryOperator::In => "1=0".to_string(),
                        _ => "1=1".to_string(),
                    });
                }

                let placeholders = vec!["?"; items.len()].join(", ");
                values.extend(items.iter().map(Self::scalar));
                Ok(format!("{} {} ({})", field, op.to_sql(), placeholders))
            }
            (op, Some(value)) => {
                values.push(Self::scalar(value));
                Ok(format!("{} {} ?", field, op.to_sql()))
            }
            (op, None) => Err(StoreError::invalid_argument(format!(
                "operator {} on '{}' needs a value",
                op.to_sql(),
                condition.field
            ))),
        }
    }

    /// Left-hand side of a condition: a column, or an aggregate in HAVING
    fn operand_sql(field: &str) -> StoreResult<String> {
        if let Ok(column) = ValidatedFieldName::new(field) {
            return Ok(column.quoted());
        }

        match SelectField::parse(field)? {
            aggregate @ SelectField::Aggregate { alias: None, .. } => aggregate.to_sql(),
            _ => Err(StoreError::invalid_argument(format!(
                "invalid condition operand '{}'",
                field
            ))),
        }
    }

    /// Lists bound to a single placeholder travel as JSON documents
    fn scalar(value: &SqlValue) -> SqlValue {
        match value {
            list @ SqlValue::List(_) => SqlValue::Json(list.to_json()),
            other => other.clone(),
        }
    }

    /// Build ORDER BY clause
    pub fn build_order_clause(order_by: &[String]) -> StoreResult<String> {
        if order_by.is_empty() {
            return Ok(String::new());
        }

        let order_items = order_by
            .iter()
            .map(|expr| OrderBy::parse(expr).map(|o| o.to_sql()))
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(format!("ORDER BY {}", order_items.join(", ")))
    }

    /// Build LIMIT/OFFSET clause
    pub fn build_limit_clause(page: Option<&Page>, limit: Option<u64>) -> String {
        match (page, limit) {
            (Some(page), _) => page.to_sql(),
            (None, Some(limit)) => format!("LIMIT {}", limit),
            (None, None) => String::new(),
        }
    }

    /// Build SELECT clause from fields
    pub fn build_select_clause(fields: &[String]) -> StoreResult<String> {
        let items: Vec<&str> = fields
            .iter()
            .flat_map(|entry| split_top_level(entry))
            .collect();

        if items.is_empty() {
            return Ok("*".to_string());
        }

        let field_parts = items
            .into_iter()
            .map(|item| SelectField::parse(item)?.to_sql())
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(field_parts.join(", "))
    }

    /// Build JOIN clause
    pub fn build_join_clause(join: Option<&Join>) -> StoreResult<String> {
        match join {
            Some(join) => join.to_sql(),
            None => Ok(String::new()),
        }
    }

    /// Build GROUP BY clause
    pub fn build_group_by_clause(group_by: Option<&GroupBy>) -> StoreResult<String> {
        match group_by {
            Some(group) if !group.fields.is_empty() => {
                let fields = group
                    .fields
                    .iter()
                    .map(|f| ValidatedFieldName::new(f).map(|f| f.quoted()))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("GROUP BY {}", fields.join(", ")))
            }
            _ => Ok(String::new()),
        }
    }

    /// Build HAVING clause
    pub fn build_having_clause(group_by: Option<&GroupBy>) -> StoreResult<(String, Vec<SqlValue>)> {
        let conditions = match group_by.and_then(|g| g.having.as_ref()) {
            Some(conditions) if !conditions.is_empty() => conditions,
            _ => return Ok((String::new(), Vec::new())),
        };

        let mut values = Vec::new();
        let conditions_sql = conditions
            .iter()
            .map(|condition| Self::build_condition_sql(condition, &mut values))
            .collect::<StoreResult<Vec<_>>>()?
            .join(" AND ");

        Ok((format!("HAVING {}", conditions_sql), values))
    }

    /// `SELECT [DISTINCT] fields FROM table [join] [where] [group] [having] [order] [limit]`
    pub fn select(table: &ValidatedTableName, spec: &QuerySpec) -> StoreResult<Statement> {
        let select_clause = Self::build_select_clause(&spec.fields)?;
        let join_clause = Self::build_join_clause(spec.join.as_ref())?;
        let (where_clause, mut params) = Self::build_where_clause(spec)?;
        let group_clause = Self::build_group_by_clause(spec.group_by.as_ref())?;
        let (having_clause, having_params) = Self::build_having_clause(spec.group_by.as_ref())?;
        let order_clause = Self::build_order_clause(&spec.order_by)?;
        let limit_clause = Self::build_limit_clause(spec.page.as_ref(), spec.limit);
        params.extend(having_params);

        let head = if spec.distinct {
            format!("SELECT DISTINCT {} FROM {}", select_clause, table.quoted())
        } else {
            format!("SELECT {} FROM {}", select_clause, table.quoted())
        };

        Ok(Statement {
            sql: assemble(&[
                head.as_str(),
                join_clause.as_str(),
                where_clause.as_str(),
                group_clause.as_str(),
                having_clause.as_str(),
                order_clause.as_str(),
                limit_clause.as_str(),
            ]),
            params,
        })
    }

    /// `SELECT COUNT(1) AS count ...` over the same join and filters.
    ///
    /// Grouped or DISTINCT specs are counted through a subquery, so the total is the
    /// number of rows the select would return without paging.
    pub fn count(table: &ValidatedTableName, spec: &QuerySpec) -> StoreResult<Statement> {
        if spec.group_by.is_some() || spec.distinct {
            let unpaged = QuerySpec {
                order_by: Vec::new(),
                page: None,
                limit: None,
                ..spec.clone()
            };
            let inner = Self::select(table, &unpaged)?;
            return Ok(Statement {
                sql: format!("SELECT COUNT(1) AS count FROM ({}) AS counted", inner.sql),
                params: inner.params,
            });
        }

        Self::aggregate(table, "COUNT(1) AS count", spec)
    }

    /// `SELECT CAST(IFNULL(SUM(field), 0) AS DOUBLE) AS total ...`
    pub fn sum(table: &ValidatedTableName, field: &str, spec: &QuerySpec) -> StoreResult<Statement> {
        let field = ValidatedFieldName::new(field)?;
        let expr = format!("CAST(IFNULL(SUM({}), 0) AS DOUBLE) AS total", field.quoted());
        Self::aggregate(table, &expr, spec)
    }

    /// `SELECT COUNT(DISTINCT c1, c2, ...) AS count ...`
    pub fn distinct_count<S: AsRef<str>>(
        table: &ValidatedTableName,
        columns: &[S],
        spec: &QuerySpec,
    ) -> StoreResult<Statement> {
        if columns.is_empty() {
            return Err(StoreError::invalid_argument(
                "distinct count needs at least one column",
            ));
        }

        let columns = columns
            .iter()
            .map(|c| ValidatedFieldName::new(c.as_ref()).map(|f| f.quoted()))
            .collect::<Result<Vec<_>, _>>()?;
        let expr = format!("COUNT(DISTINCT {}) AS count", columns.join(", "));
        Self::aggregate(table, &expr, spec)
    }

    fn aggregate(table: &ValidatedTableName, expr: &str, spec: &QuerySpec) -> StoreResult<Statement> {
        let join_clause = Self::build_join_clause(spec.join.as_ref())?;
        let (where_clause, params) = Self::build_where_clause(spec)?;
        let head = format!("SELECT {} FROM {}", expr, table.quoted());

        Ok(Statement {
            sql: assemble(&[head.as_str(), join_clause.as_str(), where_clause.as_str()]),
            params,
        })
    }

    /// `INSERT INTO table (cols) VALUES (?, ...)`
    pub fn insert(table: &ValidatedTableName, row: &Values) -> StoreResult<Statement> {
        let columns = row
            .keys()
            .map(|c| crate::validation::quote_identifier(c))
            .collect::<Result<Vec<_>, _>>()?;
        let placeholders = vec!["?"; columns.len()].join(", ");

        Ok(Statement {
            sql: format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table.quoted(),
                columns.join(", "),
                placeholders
            ),
            params: row.values().map(Self::scalar).collect(),
        })
    }

    /// `UPDATE table SET col = ?, ... WHERE ... [LIMIT n]`.
    ///
    /// Both the data and the predicate must be non-empty.
    pub fn update(
        table: &ValidatedTableName,
        data: &Values,
        spec: &QuerySpec,
        limit: Option<u64>,
    ) -> StoreResult<Statement> {
        if data.is_empty() {
            return Err(StoreError::invalid_argument("update data is empty"));
        }

        let (where_clause, where_params) = Self::build_where_clause(spec)?;
        if where_clause.is_empty() {
            return Err(StoreError::invalid_argument(
                "update requires at least one filter",
            ));
        }

        let assignments = data
            .keys()
            .map(|c| crate::validation::quote_identifier(c).map(|c| format!("{} = ?", c)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut params: Vec<SqlValue> = data.values().map(Self::scalar).collect();
        params.extend(where_params);

        let head = format!("UPDATE {} SET {}", table.quoted(), assignments.join(", "));
        let limit_clause = limit.map(|n| format!("LIMIT {}", n)).unwrap_or_default();

        Ok(Statement {
            sql: assemble(&[head.as_str(), where_clause.as_str(), limit_clause.as_str()]),
            params,
        })
    }

    /// `DELETE FROM table [WHERE ...]`; no filters deletes every row
    pub fn delete(table: &ValidatedTableName, spec: &QuerySpec) -> StoreResult<Statement> {
        let (where_clause, params) = Self::build_where_clause(spec)?;
        let head = format!("DELETE FROM {}", table.quoted());

        Ok(Statement {
            sql: assemble(&[head.as_str(), where_clause.as_str()]),
            params,
        })
    }
}

/// Join non-empty clauses with single spaces
fn assemble(parts: &[&str]) -> String {
    let mut sql = String::with_capacity(parts.iter().map(|p| p.len() + 1).sum());
    for part in parts.iter().filter(|p| !p.is_empty()) {
        if !sql.is_empty() {
            sql.push(' ');
        }
        sql.push_str(part);
    }
    sql
}

/// Split a projection list on commas that are not inside parentheses
fn split_top_level(list: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in list.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(list[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(list[start..].trim());

    items.into_iter().filter(|item| !item.is_empty()).collect()
}
