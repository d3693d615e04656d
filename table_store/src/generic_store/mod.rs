pub mod core;
pub mod operations;

pub use self::core::TableStore;
