//! Pagination
//!
//! Pages are 1-indexed. The offset is always `(page - 1) * page_size`.

use crate::errors::{StoreError, StoreResult};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// A validated page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: u64,
    page_size: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Page {
    /// Both values must be at least 1
    pub fn new(page: u64, page_size: u64) -> StoreResult<Self> {
        if page == 0 {
            return Err(StoreError::invalid_argument("page must be >= 1"));
        }
        if page_size == 0 {
            return Err(StoreError::invalid_argument("page size must be >= 1"));
        }
        (page - 1)
            .checked_mul(page_size)
            .ok_or_else(|| StoreError::invalid_argument("page offset overflows"))?;

        Ok(Self { page, page_size })
    }

    /// Request parameters where a missing value falls back to the default
    pub fn from_params(page: Option<u64>, page_size: Option<u64>) -> StoreResult<Self> {
        Self::new(
            page.unwrap_or(DEFAULT_PAGE),
            page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }

    pub fn to_sql(&self) -> String {
        format!("LIMIT {} OFFSET {}", self.limit(), self.offset())
    }
}
