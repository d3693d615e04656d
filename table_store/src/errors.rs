use thiserror::Error;
use type_mapping::MappingError;

use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Connection registry is not initialized")]
    NotInitialized,

    #[error("Unknown database alias: {0}")]
    UnknownAlias(String),

    #[error("Invalid database configuration: {0}")]
    Configuration(String),

    #[error("Cannot connect database '{alias}': {source}")]
    Connectivity {
        alias: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Unique constraint violated: {0}")]
    ConstraintViolation(#[source] sqlx::Error),

    #[error("Record not found")]
    NotFound,

    #[error(transparent)]
    Engine(sqlx::Error),
}

impl StoreError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn connectivity(alias: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Connectivity {
            alias: alias.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Underlying driver error, when there is one
    pub fn engine_error(&self) -> Option<&sqlx::Error> {
        match self {
            Self::Connectivity { source, .. } => Some(source),
            Self::ConstraintViolation(source) | Self::Engine(source) => Some(source),
            _ => None,
        }
    }
}

/// Driver errors are classified on the way in: missing rows become `NotFound`
/// and duplicate keys become `ConstraintViolation`.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        crate::classify::classify_sqlx(err)
    }
}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

impl From<MappingError> for StoreError {
    fn from(err: MappingError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
