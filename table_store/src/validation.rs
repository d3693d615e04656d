//! Validation module
//!
//! Identifiers that end up in SQL text (tables, columns, order and group keys)
//! are validated here and rendered backtick-quoted, so reserved words such as
//! `order` or `key` are usable as column names.

use std::fmt;

/// Validation errors for database identifiers
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Name contains invalid characters (only alphanumeric, `_` and `$` allowed)
    InvalidCharacters(String),
    /// Name is too long (MySQL limit is 64 characters)
    TooLong {
        name: String,
        length: usize,
        max_length: usize,
    },
    /// Name is empty
    Empty,
    /// Name starts with invalid character (must start with letter or underscore)
    InvalidStartCharacter(String),
    /// Qualified name has more than one dot or an empty segment
    InvalidQualifier(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidCharacters(name) => {
                write!(f, "Invalid characters in name '{}': only alphanumeric characters, '_' and '$' are allowed", name)
            }
            ValidationError::TooLong {
                name,
                length,
                max_length,
            } => {
                write!(
                    f,
                    "Name '{}' is too long: {} characters (max {})",
                    name, length, max_length
                )
            }
            ValidationError::Empty => {
                write!(f, "Name cannot be empty")
            }
            ValidationError::InvalidStartCharacter(name) => {
                write!(f, "Name '{}' must start with a letter or underscore", name)
            }
            ValidationError::InvalidQualifier(name) => {
                write!(f, "Name '{}' must be 'column' or 'table.column'", name)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// MySQL identifier length limit
const MAX_LENGTH: usize = 64;

fn validate_identifier(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::Empty);
    }

    if name.len() > MAX_LENGTH {
        return Err(ValidationError::TooLong {
            name: name.to_string(),
            length: name.len(),
            max_length: MAX_LENGTH,
        });
    }

    let first_char = name.chars().next().ok_or(ValidationError::Empty)?;
    if !first_char.is_ascii_alphabetic() && first_char != '_' {
        return Err(ValidationError::InvalidStartCharacter(name.to_string()));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    {
        return Err(ValidationError::InvalidCharacters(name.to_string()));
    }

    Ok(())
}

/// A validated table name that is safe to use in SQL queries
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedTableName(String);

impl ValidatedTableName {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        validate_identifier(name)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Backtick-quoted form for SQL text
    pub fn quoted(&self) -> String {
        format!("`{}`", self.0)
    }
}

impl fmt::Display for ValidatedTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated column reference: `column`, `table.column` or `table.*`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedFieldName {
    qualifier: Option<String>,
    column: String,
}

impl ValidatedFieldName {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        let mut parts = name.split('.');
        let first = parts.next().unwrap_or_default();
        let second = parts.next();

        if parts.next().is_some() {
            return Err(ValidationError::InvalidQualifier(name.to_string()));
        }

        match second {
            None => {
                validate_identifier(first)?;
                Ok(Self {
                    qualifier: None,
                    column: first.to_string(),
                })
            }
            Some(column) => {
                if first.is_empty() || column.is_empty() {
                    return Err(ValidationError::InvalidQualifier(name.to_string()));
                }
                validate_identifier(first)?;
                if column != "*" {
                    validate_identifier(column)?;
                }
                Ok(Self {
                    qualifier: Some(first.to_string()),
                    column: column.to_string(),
                })
            }
        }
    }

    /// Column part without qualifier
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// Backtick-quoted form for SQL text, e.g. `` `users`.`id` `` or `` `users`.* ``
    pub fn quoted(&self) -> String {
        let column = if self.column == "*" {
            "*".to_string()
        } else {
            format!("`{}`", self.column)
        };

        match &self.qualifier {
            Some(qualifier) => format!("`{}`.{}", qualifier, column),
            None => column,
        }
    }
}

impl fmt::Display for ValidatedFieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{}.{}", qualifier, self.column),
            None => write!(f, "{}", self.column),
        }
    }
}

/// True when `name` is a plain or qualified column reference
pub fn is_valid_field_name(name: &str) -> bool {
    ValidatedFieldName::new(name).is_ok()
}

/// Validate an unqualified identifier (result aliases) and quote it
pub fn quote_identifier(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    validate_identifier(name)?;
    Ok(format!("`{}`", name))
}
