//! Pagination related types for list endpoints

use serde::{Deserialize, Serialize};

/// Minimum number of items per page
pub const MIN_PER_PAGE: u32 = 1;

/// Maximum number of items per page
pub const MAX_PER_PAGE: u32 = 100;

/// Pagination parameters for list endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: u32,

    /// Number of items per page
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl Pagination {
    /// Create a new pagination with custom values
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(MIN_PER_PAGE, MAX_PER_PAGE),
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> u32 {
        (self.page.saturating_sub(1)) * self.per_page
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> u32 {
        self.per_page
    }

    /// Calculate offset as i64 for SQL queries
    pub fn offset_i64(&self) -> i64 {
        self.offset() as i64
    }

    /// Calculate limit as i64 for SQL queries
    pub fn limit_i64(&self) -> i64 {
        self.limit() as i64
    }

    /// Check if this is the first page
    pub fn is_first_page(&self) -> bool {
        self.page == 1
    }
}

/// Paginated response wrapper with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// The actual data items
    pub data: Vec<T>,

    /// Current page number
    pub page: u32,

    /// Items per page
    pub per_page: u32,

    /// Total number of items
    pub total: u64,

    /// Total number of pages
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    /// Create a new paginated response
    pub fn new(data: Vec<T>, pagination: Pagination, total: u64) -> Self {
        Self {
            data,
            page: pagination.page,
            per_page: pagination.per_page,
            total,
            total_pages: Self::calculate_total_pages(total, pagination.per_page),
        }
    }

    /// Create an empty paginated response
    pub fn empty(pagination: Pagination) -> Self {
        Self {
            data: Vec::new(),
            page: pagination.page,
            per_page: pagination.per_page,
            total: 0,
            total_pages: 0,
        }
    }

    /// Calculate total pages from total items and items per page
    fn calculate_total_pages(total: u64, per_page: u32) -> u32 {
        if total == 0 {
            return 0;
        }
        ((total + per_page as u64 - 1) / per_page as u64) as u32
    }

    /// Check if the response is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the number of items in this page
    pub fn count(&self) -> usize {
        self.data.len()
    }
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}
