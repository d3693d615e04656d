use crate::errors::{StoreError, StoreResult};
use crate::validation::ValidatedFieldName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// One ORDER BY key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: ValidatedFieldName,
    pub order: SortOrder,
}

impl OrderBy {
    pub fn asc(field: &str) -> StoreResult<Self> {
        Ok(Self {
            field: ValidatedFieldName::new(field)?,
            order: SortOrder::Asc,
        })
    }

    pub fn desc(field: &str) -> StoreResult<Self> {
        Ok(Self {
            field: ValidatedFieldName::new(field)?,
            order: SortOrder::Desc,
        })
    }

    /// Parse `column`, `column ASC` or `table.column desc`
    pub fn parse(expr: &str) -> StoreResult<Self> {
        let mut parts = expr.split_whitespace();
        let field = parts
            .next()
            .ok_or_else(|| StoreError::invalid_argument("empty order expression"))?;

        let order = match parts.next() {
            None => SortOrder::Asc,
            Some(dir) if dir.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            Some(dir) if dir.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            Some(dir) => {
                return Err(StoreError::invalid_argument(format!(
                    "invalid sort direction '{}' in '{}'",
                    dir, expr
                )))
            }
        };

        if parts.next().is_some() {
            return Err(StoreError::invalid_argument(format!(
                "invalid order expression '{}'",
                expr
            )));
        }

        Ok(Self {
            field: ValidatedFieldName::new(field)?,
            order,
        })
    }

    pub fn to_sql(&self) -> String {
        format!("{} {}", self.field.quoted(), self.order.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_expressions() {
        assert_eq!(OrderBy::parse("id").unwrap().to_sql(), "`id` ASC");
        assert_eq!(OrderBy::parse("id desc").unwrap().to_sql(), "`id` DESC");
        assert_eq!(
            OrderBy::parse("  m.created_at   DESC ").unwrap().to_sql(),
            "`m`.`created_at` DESC"
        );
    }

    #[test]
    fn test_invalid_order_expressions() {
        assert!(OrderBy::parse("").is_err());
        assert!(OrderBy::parse("id sideways").is_err());
        assert!(OrderBy::parse("id desc, (select 1)").is_err());
        assert!(OrderBy::parse("rand()").is_err());
    }
}
