//! Infrastructure layer for the GearShare booking engine.
//!
//! Provides the MySQL-backed implementations of the repository traits
//! defined in `gs_core`, plus connection pool management. The booking
//! repository is where the availability engine's concurrency contract is
//! honored against a real store: check-then-insert runs inside a
//! transaction with the item row locked.

pub mod database;

pub use database::connection::{DatabasePool, PoolStatistics};
pub use database::mysql::{MySqlBookingRepository, MySqlItemRepository};

use thiserror::Error;

/// Infrastructure layer errors
#[derive(Error, Debug)]
pub enum InfrastructureError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for gs_core::errors::DomainError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Database(e) => gs_core::errors::DomainError::Database {
                message: e.to_string(),
            },
            InfrastructureError::Config(message) => {
                gs_core::errors::DomainError::Internal { message }
            }
            InfrastructureError::General(message) => {
                gs_core::errors::DomainError::Internal { message }
            }
        }
    }
}
