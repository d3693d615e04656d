use crate::errors::{StoreError, StoreResult};
use crate::validation::{quote_identifier, ValidatedFieldName};

/// Represents SQL aggregate functions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateFunction {
    /// COUNT(*) or COUNT(field)
    Count,
    /// SUM(field)
    Sum,
    /// AVG(field)
    Avg,
    /// MIN(field)
    Min,
    /// MAX(field)
    Max,
    /// COUNT(DISTINCT field)
    CountDistinct,
}

impl AggregateFunction {
    /// Convert aggregate function to SQL string
    pub fn to_sql(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
            AggregateFunction::CountDistinct => "COUNT",
        }
    }

    /// Check if this is a DISTINCT aggregate
    pub fn is_distinct(&self) -> bool {
        matches!(self, AggregateFunction::CountDistinct)
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "COUNT" => Some(AggregateFunction::Count),
            "SUM" => Some(AggregateFunction::Sum),
            "AVG" => Some(AggregateFunction::Avg),
            "MIN" => Some(AggregateFunction::Min),
            "MAX" => Some(AggregateFunction::Max),
            _ => None,
        }
    }
}

/// Represents a field selection in a SELECT clause
#[derive(Debug, Clone, PartialEq)]
pub enum SelectField {
    /// Select all fields: SELECT *
    All,
    /// Select specific field: SELECT field_name
    Field(String),
    /// Select field with alias: SELECT field_name AS alias
    FieldWithAlias { field: String, alias: String },
    /// Select aggregate function: SELECT COUNT(field)
    Aggregate {
        function: AggregateFunction,
        field: Option<String>, // None for COUNT(*)
        alias: Option<String>,
    },
}

impl SelectField {
    /// Create a simple field selection
    pub fn field(field: impl Into<String>) -> Self {
        SelectField::Field(field.into())
    }

    /// Create a field with alias
    pub fn field_as(field: impl Into<String>, alias: impl Into<String>) -> Self {
        SelectField::FieldWithAlias {
            field: field.into(),
            alias: alias.into(),
        }
    }

    /// Create COUNT(*) aggregate
    pub fn count_all() -> Self {
        SelectField::Aggregate {
            function: AggregateFunction::Count,
            field: None,
            alias: None,
        }
    }

    fn aggregate(function: AggregateFunction, field: impl Into<String>) -> Self {
        SelectField::Aggregate {
            function,
            field: Some(field.into()),
            alias: None,
        }
    }

    /// Create COUNT(field) aggregate
    pub fn count(field: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::Count, field)
    }

    /// Create COUNT(DISTINCT field) aggregate
    pub fn count_distinct(field: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::CountDistinct, field)
    }

    /// Create SUM(field) aggregate
    pub fn sum(field: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::Sum, field)
    }

    /// Create AVG(field) aggregate
    pub fn avg(field: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::Avg, field)
    }

    /// Create MIN(field) aggregate
    pub fn min(field: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::Min, field)
    }

    /// Create MAX(field) aggregate
    pub fn max(field: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::Max, field)
    }

    /// Add an alias to this select field
    pub fn with_alias(self, alias: impl Into<String>) -> Self {
        match self {
            SelectField::Field(field) | SelectField::FieldWithAlias { field, .. } => {
                SelectField::FieldWithAlias {
                    field,
                    alias: alias.into(),
                }
            }
            SelectField::Aggregate {
                function, field, ..
            } => SelectField::Aggregate {
                function,
                field,
                alias: Some(alias.into()),
            },
            other => other,
        }
    }

    /// Parse a projection item.
    ///
    /// Accepted forms: `*`, `col`, `t.col`, `t.*`, `col AS alias` and the aggregates
    /// `COUNT(*)`, `COUNT(1)`, `COUNT(DISTINCT col)`, `SUM(col)`, `AVG(col)`,
    /// `MIN(col)`, `MAX(col)`, each optionally followed by `AS alias`.
    pub fn parse(expr: &str) -> StoreResult<Self> {
        let expr = expr.trim();
        if expr == "*" {
            return Ok(SelectField::All);
        }

        let lower = expr.to_ascii_lowercase();
        let (body, alias) = match lower.rfind(" as ") {
            Some(pos) => (expr[..pos].trim(), Some(expr[pos + 4..].trim())),
            None => (expr, None),
        };

        let field = match body.find('(') {
            Some(open) if body.ends_with(')') => {
                let name = body[..open].trim();
                let inner = body[open + 1..body.len() - 1].trim();
                Self::parse_aggregate(expr, name, inner)?
            }
            Some(_) => {
                return Err(StoreError::invalid_argument(format!(
                    "unsupported select expression '{}'",
                    expr
                )))
            }
            None => SelectField::Field(body.to_string()),
        };

        Ok(match alias {
            Some(alias) => field.with_alias(alias),
            None => field,
        })
    }

    fn parse_aggregate(expr: &str, name: &str, inner: &str) -> StoreResult<Self> {
        let function = AggregateFunction::from_name(name).ok_or_else(|| {
            StoreError::invalid_argument(format!("unsupported function in '{}'", expr))
        })?;

        let mut words = inner.split_whitespace();
        let distinct = match words.next() {
            Some(first) if first.eq_ignore_ascii_case("distinct") => true,
            _ => false,
        };

        if distinct {
            if function != AggregateFunction::Count {
                return Err(StoreError::invalid_argument(format!(
                    "DISTINCT is only supported with COUNT in '{}'",
                    expr
                )));
            }
            let rest = inner["distinct".len()..].trim();
            return Ok(Self::count_distinct(rest));
        }

        if inner == "*" || inner == "1" {
            if function != AggregateFunction::Count {
                return Err(StoreError::invalid_argument(format!(
                    "'{}' needs a column",
                    expr
                )));
            }
            return Ok(Self::count_all());
        }

        Ok(Self::aggregate(function, inner))
    }

    /// Render with identifiers validated and quoted
    pub fn to_sql(&self) -> StoreResult<String> {
        Ok(match self {
            SelectField::All => "*".to_string(),
            SelectField::Field(name) => ValidatedFieldName::new(name)?.quoted(),
            SelectField::FieldWithAlias { field, alias } => format!(
                "{} AS {}",
                ValidatedFieldName::new(field)?.quoted(),
                quote_identifier(alias)?
            ),
            SelectField::Aggregate {
                function,
                field,
                alias,
            } => {
                let field_part = match field {
                    Some(f) if function.is_distinct() => {
                        format!("DISTINCT {}", ValidatedFieldName::new(f)?.quoted())
                    }
                    Some(f) => ValidatedFieldName::new(f)?.quoted(),
                    None => "*".to_string(),
                };

                let aggregate = format!("{}({})", function.to_sql(), field_part);

                match alias {
                    Some(alias) => format!("{} AS {}", aggregate, quote_identifier(alias)?),
                    None => aggregate,
                }
            }
        })
    }
}
