//! Error types for the relstore crate
//!
//! This module contains all error types that can be returned by the facade.

use config::ConfigError;
use table_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelStoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RelStoreError {
    /// The data-access error, when this is one
    pub fn as_store_error(&self) -> Option<&StoreError> {
        match self {
            Self::Store(err) => Some(err),
            Self::Config(_) => None,
        }
    }
}
