//! Unified type mapping between Rust values and MySQL bind parameters
//! This crate provides the value representation shared by the relstore crates

pub mod serialize;
pub mod types;

pub use serialize::{serialize_to_columns, MappingError};
pub use types::{SqlValue, Values};
