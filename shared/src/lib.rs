//! Shared utilities and common types for GearShare server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Common type definitions (date ranges, pagination)

pub mod config;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{AppConfig, DatabaseConfig, Environment, LoggingConfig};
pub use types::{DateRange, PaginatedResponse, Pagination};
