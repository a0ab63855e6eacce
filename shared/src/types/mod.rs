//! Type definitions module with domain-specific sub-modules
//!
//! This module organizes types into logical categories:
//! - `date_range` - Calendar date ranges for rental periods
//! - `pagination` - Pagination for list endpoints

pub mod date_range;
pub mod pagination;

// Re-export commonly used types at module level
pub use date_range::{DateRange, DateRangeError};
pub use pagination::{PaginatedResponse, Pagination};
