//! Domain-specific error types for the booking engine
//!
//! This module provides error type definitions for booking operations and
//! input validation. The HTTP layer (out of scope for this crate) maps these
//! to status codes and user-facing messages.

use thiserror::Error;

use crate::domain::entities::booking::BookingStatus;
use gs_shared::types::date_range::DateRangeError;

/// Booking-related errors
///
/// These errors represent business-rule failures of the availability engine.
/// None of them is retried automatically; the caller's remedy is stated per
/// variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Requested quantity exceeds what is free on some day of the range.
    /// Carries requested vs. available for user-facing messaging.
    #[error("Insufficient inventory: requested {requested}, available {available}")]
    InsufficientInventory { requested: u32, available: u32 },

    /// A state transition was requested from a state that does not allow it
    #[error("Cannot {action} a booking in state {current}")]
    InvalidState {
        current: BookingStatus,
        action: &'static str,
    },

    /// Confirmation attempted after the hold lapsed. The caller should
    /// re-check availability and create a new booking.
    #[error("Booking hold has expired")]
    Expired,

    /// Only verified accounts may create bookings
    #[error("Renter account is not verified")]
    RenterNotVerified,
}

/// Input validation errors
///
/// Always recoverable by the caller correcting input; never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Out of range: {field} (min: {min}, max: {max})")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    #[error("End date must be after start date")]
    EmptyDateRange,

    /// Reservation creation with a start date in the past
    #[error("Start date must not be in the past")]
    StartDateInPast,

    /// Extension with an end date at or before the current end date
    #[error("New end date must be after the current end date")]
    EndDateNotExtended,
}

impl From<DateRangeError> for ValidationError {
    fn from(err: DateRangeError) -> Self {
        match err {
            DateRangeError::EmptyRange => ValidationError::EmptyDateRange,
        }
    }
}
