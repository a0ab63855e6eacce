//! Repository interfaces for entity persistence.
//!
//! Concrete implementations live in the infrastructure layer; mocks for
//! testing live alongside each trait.

pub mod booking;
pub mod item;

pub use booking::BookingRepository;
pub use item::ItemRepository;

pub use booking::MockBookingRepository;
pub use item::MockItemRepository;
