//! Booking entity representing a time-limited reservation of rental inventory.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gs_shared::types::DateRange;

use crate::errors::BookingError;

/// Minimum quantity of units per booking
pub const MIN_QUANTITY: u32 = 1;

/// Maximum quantity of units per booking
pub const MAX_QUANTITY: u32 = 10;

/// Default hold duration for a pending booking (30 minutes)
pub const DEFAULT_HOLD_MINUTES: i64 = 30;

/// Lifecycle status of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Time-limited hold awaiting confirmation
    Pending,
    /// Confirmed reservation
    Confirmed,
    /// Rental period fulfilled
    Completed,
    /// Explicitly cancelled (or lapsed hold rewritten by the sweep)
    Cancelled,
}

impl BookingStatus {
    /// String representation used for persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

/// Booking entity for rental reservations
///
/// A booking starts life as a PENDING hold that reserves inventory for a
/// limited time. It either matures into CONFIRMED (and later COMPLETED) or is
/// CANCELLED; a PENDING hold whose `expires_at` has lapsed stops reserving
/// inventory even before its status row is rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier for the booking
    pub id: Uuid,

    /// Item being reserved
    pub item_id: Uuid,

    /// User making the reservation
    pub renter_id: Uuid,

    /// Rental period, half-open `[start, end)`
    pub range: DateRange,

    /// Number of units reserved (1..=10)
    pub quantity: u32,

    /// Current lifecycle status
    pub status: BookingStatus,

    /// Total price: price_per_day x duration_days x quantity
    pub total_price: Decimal,

    /// Timestamp when the booking was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the PENDING hold lapses (meaningless in other states)
    pub expires_at: DateTime<Utc>,
}

impl Booking {
    /// Create a new PENDING booking with the default 30-minute hold
    pub fn new(
        item_id: Uuid,
        renter_id: Uuid,
        range: DateRange,
        quantity: u32,
        total_price: Decimal,
    ) -> Self {
        Self::new_with_hold(
            item_id,
            renter_id,
            range,
            quantity,
            total_price,
            DEFAULT_HOLD_MINUTES,
        )
    }

    /// Create a new PENDING booking with a custom hold duration
    ///
    /// A zero or negative `hold_minutes` produces an already-lapsed hold,
    /// which tests use to exercise expiry behaviour.
    pub fn new_with_hold(
        item_id: Uuid,
        renter_id: Uuid,
        range: DateRange,
        quantity: u32,
        total_price: Decimal,
        hold_minutes: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            item_id,
            renter_id,
            range,
            quantity,
            status: BookingStatus::Pending,
            total_price,
            created_at: now,
            expires_at: now + Duration::minutes(hold_minutes),
        }
    }

    /// Total price for a rental: rate x days x quantity
    pub fn price_total(price_per_day: Decimal, range: &DateRange, quantity: u32) -> Decimal {
        price_per_day * Decimal::from(range.duration_days()) * Decimal::from(quantity)
    }

    /// Check whether a PENDING hold has lapsed
    ///
    /// Only meaningful for PENDING bookings; other states never expire.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Check expiry against an explicit instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status == BookingStatus::Pending && now > self.expires_at
    }

    /// Check whether the booking reserves inventory right now
    ///
    /// Active means CONFIRMED, or PENDING with an unlapsed hold. CANCELLED
    /// and COMPLETED bookings never reserve inventory.
    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    /// Check activity against an explicit instant
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            BookingStatus::Confirmed => true,
            BookingStatus::Pending => now <= self.expires_at,
            BookingStatus::Completed | BookingStatus::Cancelled => false,
        }
    }

    /// Check whether the rental period covers a given day
    pub fn covers(&self, day: chrono::NaiveDate) -> bool {
        self.range.contains(day)
    }

    /// Rental duration in days
    pub fn duration_days(&self) -> i64 {
        self.range.duration_days()
    }

    /// Transition PENDING -> CONFIRMED
    ///
    /// Fails with `Expired` if the hold has lapsed, and with `InvalidState`
    /// from any state other than PENDING.
    pub fn confirm(&mut self) -> Result<(), BookingError> {
        match self.status {
            BookingStatus::Pending if self.is_expired() => Err(BookingError::Expired),
            BookingStatus::Pending => {
                self.status = BookingStatus::Confirmed;
                Ok(())
            }
            current => Err(BookingError::InvalidState {
                current,
                action: "confirm",
            }),
        }
    }

    /// Transition PENDING/CONFIRMED -> CANCELLED
    ///
    /// Cancelling an already-cancelled booking is an idempotent no-op.
    /// COMPLETED bookings cannot be cancelled.
    pub fn cancel(&mut self) -> Result<(), BookingError> {
        match self.status {
            BookingStatus::Pending | BookingStatus::Confirmed => {
                self.status = BookingStatus::Cancelled;
                Ok(())
            }
            BookingStatus::Cancelled => Ok(()),
            current @ BookingStatus::Completed => Err(BookingError::InvalidState {
                current,
                action: "cancel",
            }),
        }
    }

    /// Transition CONFIRMED -> COMPLETED
    pub fn complete(&mut self) -> Result<(), BookingError> {
        match self.status {
            BookingStatus::Confirmed => {
                self.status = BookingStatus::Completed;
                Ok(())
            }
            current => Err(BookingError::InvalidState {
                current,
                action: "complete",
            }),
        }
    }
}
