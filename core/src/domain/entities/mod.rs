//! Domain entities representing core business objects.

pub mod booking;
pub mod item;

// Re-export commonly used types
pub use booking::{
    Booking, BookingStatus,
    MIN_QUANTITY, MAX_QUANTITY, DEFAULT_HOLD_MINUTES,
};
pub use item::Item;
