//! Shared Types
//!
//! Common types used across the application

use serde::{Deserialize, Serialize};

/// Pagination query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u32,

    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

const MAX_PAGE_SIZE: u32 = 100;

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PaginationParams {
    /// Calculate offset for SQL queries
    pub fn offset(&self) -> i64 {
        i64::from(self.page.max(1) - 1) * self.limit()
    }

    /// Get limit for SQL queries (clamped to 1..=100)
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size.clamp(1, MAX_PAGE_SIZE))
    }
}

/// Paged list response
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_limit() {
        let p = PaginationParams { page: 3, page_size: 20 };
        assert_eq!(p.offset(), 40);
        assert_eq!(p.limit(), 20);
    }

    #[test]
    fn test_page_zero_is_first_page() {
        let p = PaginationParams { page: 0, page_size: 10 };
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_page_size_is_clamped() {
        let p = PaginationParams { page: 1, page_size: 10_000 };
        assert_eq!(p.limit(), 100);
        let p = PaginationParams { page: 1, page_size: 0 };
        assert_eq!(p.limit(), 1);
    }
}
