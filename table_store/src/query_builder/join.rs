use crate::errors::StoreResult;
use crate::validation::{quote_identifier, ValidatedFieldName, ValidatedTableName};

/// Represents the type of SQL JOIN operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinType {
    /// INNER JOIN - returns records that have matching values in both tables
    Inner,
    /// LEFT JOIN - returns all records from the left table and matched records from the right table
    Left,
    /// RIGHT JOIN - returns all records from the right table and matched records from the left table
    Right,
    /// CROSS JOIN - returns Cartesian product of both tables
    Cross,
}

impl JoinType {
    /// Convert JoinType to SQL string
    pub fn to_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Cross => "CROSS JOIN",
        }
    }
}

/// Represents a condition for joining tables
#[derive(Debug, Clone, PartialEq)]
pub enum JoinCondition {
    /// Join on a condition (e.g., ON table1.id = table2.user_id)
    On {
        left_field: String,
        right_field: String,
    },
    /// Join using common column names (e.g., USING (id, name))
    Using(Vec<String>),
    /// No condition, for CROSS JOIN
    None,
}

/// Represents a complete typed JOIN clause
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    /// Type of join (INNER, LEFT, etc.)
    pub join_type: JoinType,
    /// Table to join with
    pub table: String,
    /// Optional table alias
    pub alias: Option<String>,
    /// Join condition (ON or USING)
    pub condition: JoinCondition,
}

impl JoinClause {
    /// Create a new JOIN clause with ON condition
    pub fn on(
        join_type: JoinType,
        table: impl Into<String>,
        left_field: impl Into<String>,
        right_field: impl Into<String>,
    ) -> Self {
        Self {
            join_type,
            table: table.into(),
            alias: None,
            condition: JoinCondition::On {
                left_field: left_field.into(),
                right_field: right_field.into(),
            },
        }
    }

    /// Create a new JOIN clause with USING condition
    pub fn using(join_type: JoinType, table: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            join_type,
            table: table.into(),
            alias: None,
            condition: JoinCondition::Using(columns),
        }
    }

    pub fn cross(table: impl Into<String>) -> Self {
        Self {
            join_type: JoinType::Cross,
            table: table.into(),
            alias: None,
            condition: JoinCondition::None,
        }
    }

    /// Add an alias for the joined table
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Get the table reference (alias if present, otherwise table name)
    pub fn table_ref(&self) -> &str {
        self.alias.as_ref().unwrap_or(&self.table)
    }

    /// Render with every identifier validated and quoted
    pub fn to_sql(&self) -> StoreResult<String> {
        let mut sql = format!(
            "{} {}",
            self.join_type.to_sql(),
            ValidatedTableName::new(&self.table)?.quoted()
        );

        if let Some(alias) = &self.alias {
            sql.push_str(" AS ");
            sql.push_str(&quote_identifier(alias)?);
        }

        match &self.condition {
            JoinCondition::On {
                left_field,
                right_field,
            } => {
                sql.push_str(&format!(
                    " ON {} = {}",
                    ValidatedFieldName::new(left_field)?.quoted(),
                    ValidatedFieldName::new(right_field)?.quoted()
                ));
            }
            JoinCondition::Using(columns) => {
                let columns = columns
                    .iter()
                    .map(|c| quote_identifier(c))
                    .collect::<Result<Vec<_>, _>>()?;
                sql.push_str(&format!(" USING ({})", columns.join(", ")));
            }
            JoinCondition::None => {}
        }

        Ok(sql)
    }
}

/// Join fragment attached to a query
#[derive(Debug, Clone, PartialEq)]
pub enum Join {
    /// Caller-supplied text, emitted as-is
    Raw(String),
    Clause(JoinClause),
    Many(Vec<JoinClause>),
}

impl Join {
    pub fn to_sql(&self) -> StoreResult<String> {
        match self {
            Join::Raw(sql) => Ok(sql.trim().to_string()),
            Join::Clause(clause) => clause.to_sql(),
            Join::Many(clauses) => Ok(clauses
                .iter()
                .map(JoinClause::to_sql)
                .collect::<StoreResult<Vec<_>>>()?
                .join(" ")),
        }
    }
}

impl From<&str> for Join {
    fn from(sql: &str) -> Self {
        Join::Raw(sql.to_string())
    }
}

impl From<String> for Join {
    fn from(sql: String) -> Self {
        Join::Raw(sql)
    }
}

impl From<JoinClause> for Join {
    fn from(clause: JoinClause) -> Self {
        Join::Clause(clause)
    }
}

impl From<Vec<JoinClause>> for Join {
    fn from(clauses: Vec<JoinClause>) -> Self {
        Join::Many(clauses)
    }
}
