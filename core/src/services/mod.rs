//! Business services containing domain logic and use cases.

pub mod booking;

// Re-export commonly used types
pub use booking::{
    BookingService, BookingServiceConfig,
    BookingSweepService, SweepConfig, SweepResult,
};
