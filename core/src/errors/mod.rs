//! Domain-specific error types and error handling.

mod types;

// Re-export all error types
pub use types::{BookingError, ValidationError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Unauthorized access")]
    Unauthorized,

    /// Serialization failure from the store under concurrent load.
    /// Retried a bounded number of times by the engine before surfacing.
    #[error("Concurrent update conflict: {message}")]
    Conflict { message: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Not-found error for an item
    pub fn item_not_found(id: uuid::Uuid) -> Self {
        DomainError::NotFound {
            resource: format!("item {}", id),
        }
    }

    /// Not-found error for a booking
    pub fn booking_not_found(id: uuid::Uuid) -> Self {
        DomainError::NotFound {
            resource: format!("booking {}", id),
        }
    }
}
