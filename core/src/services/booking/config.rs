//! Configuration for the booking service

/// Configuration for the booking service
#[derive(Debug, Clone)]
pub struct BookingServiceConfig {
    /// Minutes a PENDING hold reserves inventory before lapsing
    pub hold_minutes: i64,

    /// How many times a store serialization conflict is retried before
    /// surfacing to the caller
    pub max_conflict_retries: u32,

    /// Default look-ahead window for upcoming-booking queries (days)
    pub upcoming_window_days: i64,
}

impl Default for BookingServiceConfig {
    fn default() -> Self {
        Self {
            hold_minutes: crate::domain::entities::booking::DEFAULT_HOLD_MINUTES,
            max_conflict_retries: 3,
            upcoming_window_days: 7,
        }
    }
}
