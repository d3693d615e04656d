//! # relstore
//!
//! A generic relational data-access layer for MySQL: aliased connection pools,
//! per-table CRUD and query operations over any row type, and transactions.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use relstore::prelude::*;
//!
//! #[derive(Debug, Default, Serialize, Deserialize, FromRow)]
//! pub struct Product {
//!     pub id: u64,
//!     pub name: String,
//!     pub category: String,
//!     pub price: f64,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let relstore = RelStore::new(&config).await?;
//!
//!     let products = relstore.store::<Product>("default", "product")?;
//!
//!     let gold = Filters::new().with("category", "gold");
//!     let total = products.count(&gold, None).await?;
//!
//!     let mut page = Vec::new();
//!     products
//!         .list(&gold, Page::new(1, 20)?, &mut page, &["price desc"], None)
//!         .await?;
//!     println!("{} of {} gold products", page.len(), total);
//!
//!     relstore.close().await;
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use core::RelStore;
pub use errors::RelStoreError;

// Re-export centralized config
pub use config::{AppConfig, ConnectionSettings, DatabaseSettings};

// Re-export internal crates used in the public API
pub use table_store;
pub use type_mapping;

// Re-export external dependencies used in public API
pub use sqlx;
