//! Calendar date ranges for rental periods
//!
//! Rental periods are half-open intervals `[start, end)` over calendar dates:
//! a booking that ends on a given day releases its inventory for that day, so
//! back-to-back rentals on the same unit never collide.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when constructing a malformed date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRangeError {
    /// `end` was not strictly after `start`
    EmptyRange,
}

impl fmt::Display for DateRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRangeError::EmptyRange => write!(f, "end date must be after start date"),
        }
    }
}

impl std::error::Error for DateRangeError {}

/// Half-open calendar date range `[start, end)`
///
/// The constructor enforces `end > start`, so every `DateRange` covers at
/// least one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a date range, validating that `end` is strictly after `start`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if end <= start {
            return Err(DateRangeError::EmptyRange);
        }
        Ok(Self { start, end })
    }

    /// First day covered by the range
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// First day *not* covered by the range
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered by the range
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Check whether a day falls within the range
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day < self.end
    }

    /// Check whether two ranges share at least one day
    pub fn intersects(&self, other: &DateRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Intersection of two ranges, if any
    pub fn intersection(&self, other: &DateRange) -> Option<DateRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        DateRange::new(start, end).ok()
    }

    /// Iterate over the days covered by the range
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        let count = self.duration_days() as u64;
        (0..count).map(move |offset| start + Days::new(offset))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
