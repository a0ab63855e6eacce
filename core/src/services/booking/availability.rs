//! Peak-reservation computation for date ranges.
//!
//! The engine needs the maximum concurrently-reserved quantity across every
//! day of a requested range, not just whether any booking overlaps it.
//! Rather than leaning on a SQL dialect's aggregates, this is a sweep over
//! interval boundary events: +quantity where a booking's overlap with the
//! range begins, -quantity where it ends, with the running sum sampled after
//! each boundary. Ranges are half-open, so a booking ending on day `d` never
//! stacks with one starting on `d`.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use gs_shared::types::DateRange;

use crate::domain::entities::booking::{Booking, BookingStatus};

/// Reservation totals on the most contested day of a range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeakReservation {
    /// Units reserved on the peak day
    pub total: u32,

    /// PENDING (unlapsed) component of `total`
    pub pending: u32,

    /// CONFIRMED component of `total`
    pub confirmed: u32,
}

/// Compute the peak reserved quantity for an item over a date range
///
/// Only active bookings count: CONFIRMED, or PENDING with an unlapsed hold
/// at `now`. `exclude` lets a booking being extended ignore its own prior
/// reservation. The caller supplies bookings already filtered to the item;
/// non-intersecting and inactive rows are skipped here regardless.
pub fn peak_reserved(
    bookings: &[Booking],
    range: &DateRange,
    exclude: Option<Uuid>,
    now: DateTime<Utc>,
) -> PeakReservation {
    // (boundary day, pending delta, confirmed delta)
    let mut events: Vec<(NaiveDate, i64, i64)> = Vec::new();

    for booking in bookings {
        if exclude == Some(booking.id) || !booking.is_active_at(now) {
            continue;
        }
        let Some(overlap) = booking.range.intersection(range) else {
            continue;
        };
        let quantity = booking.quantity as i64;
        match booking.status {
            BookingStatus::Pending => {
                events.push((overlap.start(), quantity, 0));
                events.push((overlap.end(), -quantity, 0));
            }
            BookingStatus::Confirmed => {
                events.push((overlap.start(), 0, quantity));
                events.push((overlap.end(), 0, -quantity));
            }
            BookingStatus::Completed | BookingStatus::Cancelled => {}
        }
    }

    events.sort_by_key(|event| event.0);

    let mut pending: i64 = 0;
    let mut confirmed: i64 = 0;
    let mut peak = PeakReservation::default();

    // Apply every delta for a boundary day before sampling, so same-day
    // starts and ends cancel out instead of producing a phantom peak.
    let mut index = 0;
    while index < events.len() {
        let day = events[index].0;
        while index < events.len() && events[index].0 == day {
            pending += events[index].1;
            confirmed += events[index].2;
            index += 1;
        }
        let total = pending + confirmed;
        if total > peak.total as i64 {
            peak = PeakReservation {
                total: total as u32,
                pending: pending as u32,
                confirmed: confirmed as u32,
            };
        }
    }

    peak
}
