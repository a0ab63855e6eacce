//! Value objects used by the booking engine.

pub mod actor;
pub mod availability;

// Re-export commonly used types
pub use actor::{Actor, Role};
pub use availability::{AvailabilityQuote, BookingStatistics};
