//! MySQL repository implementations

pub mod booking_repository_impl;
pub mod item_repository_impl;

pub use booking_repository_impl::MySqlBookingRepository;
pub use item_repository_impl::MySqlItemRepository;
