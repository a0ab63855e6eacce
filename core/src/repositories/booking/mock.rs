//! Mock implementation of BookingRepository for testing.
//!
//! The availability-checked writes and `confirm_pending` hold the store
//! write lock across the check and the write, which gives the same
//! serialization guarantee the MySQL implementation gets from
//! `SELECT ... FOR UPDATE`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use gs_shared::types::DateRange;

use crate::domain::entities::booking::{Booking, BookingStatus};
use crate::errors::{BookingError, DomainError};
use crate::services::booking::availability::peak_reserved;

use super::BookingRepository;

/// Mock implementation of BookingRepository for testing
pub struct MockBookingRepository {
    bookings: Arc<RwLock<HashMap<Uuid, Booking>>>,
    should_fail: Arc<RwLock<bool>>,
    /// Number of upcoming availability-checked writes that fail with
    /// `Conflict` before succeeding; exercises the engine's bounded retry
    conflicts_remaining: Arc<RwLock<u32>>,
}

impl MockBookingRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            bookings: Arc::new(RwLock::new(HashMap::new())),
            should_fail: Arc::new(RwLock::new(false)),
            conflicts_remaining: Arc::new(RwLock::new(0)),
        }
    }

    /// Set whether operations should fail
    pub async fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.write().await = should_fail;
    }

    /// Make the next `count` availability-checked writes fail with a
    /// serialization conflict
    pub async fn fail_next_writes_with_conflict(&self, count: u32) {
        *self.conflicts_remaining.write().await = count;
    }

    async fn take_injected_conflict(&self) -> Result<(), DomainError> {
        let mut conflicts = self.conflicts_remaining.write().await;
        if *conflicts > 0 {
            *conflicts -= 1;
            return Err(DomainError::Conflict {
                message: "Mock serialization failure".to_string(),
            });
        }
        Ok(())
    }

    /// Insert a booking directly, bypassing the availability check.
    /// Tests use this to seed lapsed holds and historical rows.
    pub async fn insert_raw(&self, booking: Booking) {
        self.bookings.write().await.insert(booking.id, booking);
    }

    /// Snapshot of every stored booking
    pub async fn all(&self) -> Vec<Booking> {
        self.bookings.read().await.values().cloned().collect()
    }

    async fn check_failure(&self) -> Result<(), DomainError> {
        if *self.should_fail.read().await {
            return Err(DomainError::Database {
                message: "Mock repository error".to_string(),
            });
        }
        Ok(())
    }

    fn sorted_newest_first(mut bookings: Vec<Booking>) -> Vec<Booking> {
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        bookings
    }
}

impl Default for MockBookingRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingRepository for MockBookingRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, DomainError> {
        self.check_failure().await?;
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn insert_if_available(
        &self,
        booking: Booking,
        total_quantity: u32,
    ) -> Result<Booking, DomainError> {
        self.check_failure().await?;
        self.take_injected_conflict().await?;

        // The write guard is held for the check and the insert, so no
        // concurrent call can observe the store in between.
        let mut bookings = self.bookings.write().await;
        let now = Utc::now();
        let overlapping: Vec<Booking> = bookings
            .values()
            .filter(|other| {
                other.item_id == booking.item_id
                    && other.is_active_at(now)
                    && other.range.intersects(&booking.range)
            })
            .cloned()
            .collect();

        let peak = peak_reserved(&overlapping, &booking.range, None, now);
        let available = total_quantity.saturating_sub(peak.total);
        if available < booking.quantity {
            return Err(BookingError::InsufficientInventory {
                requested: booking.quantity,
                available,
            }
            .into());
        }

        bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn update_if_available(
        &self,
        booking: Booking,
        total_quantity: u32,
    ) -> Result<Booking, DomainError> {
        self.check_failure().await?;
        self.take_injected_conflict().await?;

        let mut bookings = self.bookings.write().await;
        if !bookings.contains_key(&booking.id) {
            return Err(DomainError::booking_not_found(booking.id));
        }

        let now = Utc::now();
        let overlapping: Vec<Booking> = bookings
            .values()
            .filter(|other| {
                other.item_id == booking.item_id
                    && other.is_active_at(now)
                    && other.range.intersects(&booking.range)
            })
            .cloned()
            .collect();

        let peak = peak_reserved(&overlapping, &booking.range, Some(booking.id), now);
        let available = total_quantity.saturating_sub(peak.total);
        if available < booking.quantity {
            return Err(BookingError::InsufficientInventory {
                requested: booking.quantity,
                available,
            }
            .into());
        }

        bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn confirm_pending(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Booking, DomainError> {
        self.check_failure().await?;

        // Same write guard as insert_if_available, so the status decision
        // serializes with availability checks for the item
        let mut bookings = self.bookings.write().await;
        let Some(booking) = bookings.get_mut(&id) else {
            return Err(DomainError::booking_not_found(id));
        };
        match booking.status {
            BookingStatus::Pending if booking.expires_at >= now => {
                booking.status = BookingStatus::Confirmed;
                Ok(booking.clone())
            }
            BookingStatus::Pending => {
                booking.status = BookingStatus::Cancelled;
                Err(BookingError::Expired.into())
            }
            current => Err(BookingError::InvalidState {
                current,
                action: "confirm",
            }
            .into()),
        }
    }

    async fn cancel_if_lapsed(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, DomainError> {
        self.check_failure().await?;
        let mut bookings = self.bookings.write().await;
        match bookings.get_mut(&id) {
            Some(booking)
                if booking.status == BookingStatus::Pending && booking.expires_at < now =>
            {
                booking.status = BookingStatus::Cancelled;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update(&self, booking: Booking) -> Result<Booking, DomainError> {
        self.check_failure().await?;
        let mut bookings = self.bookings.write().await;
        if !bookings.contains_key(&booking.id) {
            return Err(DomainError::booking_not_found(booking.id));
        }
        bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn find_overlapping(
        &self,
        item_id: Uuid,
        range: DateRange,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, DomainError> {
        self.check_failure().await?;
        let bookings = self.bookings.read().await;
        Ok(bookings
            .values()
            .filter(|booking| {
                booking.item_id == item_id
                    && booking.is_active_at(now)
                    && booking.range.intersects(&range)
            })
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Booking>, DomainError> {
        self.check_failure().await?;
        Ok(Self::sorted_newest_first(
            self.bookings.read().await.values().cloned().collect(),
        ))
    }

    async fn list_by_renter(&self, renter_id: Uuid) -> Result<Vec<Booking>, DomainError> {
        self.check_failure().await?;
        let bookings = self.bookings.read().await;
        Ok(Self::sorted_newest_first(
            bookings
                .values()
                .filter(|booking| booking.renter_id == renter_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_by_item(&self, item_id: Uuid) -> Result<Vec<Booking>, DomainError> {
        self.check_failure().await?;
        let bookings = self.bookings.read().await;
        Ok(Self::sorted_newest_first(
            bookings
                .values()
                .filter(|booking| booking.item_id == item_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>, DomainError> {
        self.check_failure().await?;
        let bookings = self.bookings.read().await;
        Ok(Self::sorted_newest_first(
            bookings
                .values()
                .filter(|booking| booking.status == status)
                .cloned()
                .collect(),
        ))
    }

    async fn find_expired_pending(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Booking>, DomainError> {
        self.check_failure().await?;
        let bookings = self.bookings.read().await;
        let mut expired: Vec<Booking> = bookings
            .values()
            .filter(|booking| {
                booking.status == BookingStatus::Pending && booking.expires_at < now
            })
            .cloned()
            .collect();
        expired.sort_by(|a, b| a.expires_at.cmp(&b.expires_at));
        expired.truncate(limit);
        Ok(expired)
    }
}
