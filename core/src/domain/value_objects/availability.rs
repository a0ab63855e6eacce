//! Availability summaries returned by the booking engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of an availability check for one item over a date range
///
/// `pending_reserved` and `confirmed_reserved` are the per-status components
/// of the reservation total on the peak day of the range (the day that
/// determines `available_quantity`); together they sum to the peak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityQuote {
    /// Whether the requested quantity fits on every day of the range
    pub is_available: bool,

    /// Units free on the most contested day of the range
    pub available_quantity: u32,

    /// Units held by unlapsed PENDING bookings on the peak day
    pub pending_reserved: u32,

    /// Units held by CONFIRMED bookings on the peak day
    pub confirmed_reserved: u32,
}

/// Aggregate booking counts and revenue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingStatistics {
    /// Total number of bookings
    pub total: usize,

    /// Bookings currently PENDING (lapsed or not)
    pub pending: usize,

    /// Bookings currently CONFIRMED
    pub confirmed: usize,

    /// Bookings currently COMPLETED
    pub completed: usize,

    /// Bookings currently CANCELLED
    pub cancelled: usize,

    /// Revenue from COMPLETED bookings
    pub total_revenue: Decimal,
}
