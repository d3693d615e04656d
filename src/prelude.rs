//! Convenience re-exports for common relstore usage
//!
//! This prelude module re-exports the most commonly used items,
//! making it easier to import everything you need with a single use statement.
//!
//! # Example
//!
//! ```rust
//! use relstore::prelude::*;
//!
//! let filters = Filters::new().with("category", "gold");
//! assert_eq!(filters.len(), 1);
//! ```

// Core relstore components
pub use crate::core::RelStore;
pub use crate::errors::RelStoreError;

// Re-export centralized config
pub use config::{AppConfig, ConnectionSettings, DatabaseSettings};

// Re-export the data-access layer
pub use table_store::prelude::*;

// Common external dependencies
pub use chrono;
pub use serde;
pub use serde_json;
pub use sqlx;
pub use tokio;
