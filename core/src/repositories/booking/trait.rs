//! Booking repository trait defining the interface for booking persistence.
//!
//! Besides plain CRUD, the trait carries the operations with a concurrency
//! contract: `insert_if_available` and `update_if_available` must make their
//! availability check and write atomic with respect to concurrent calls for
//! the same item, or two renters can overbook the last unit, and
//! `confirm_pending` must make its hold-expiry decision under the same
//! serialization.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use gs_shared::types::DateRange;

use crate::domain::entities::booking::{Booking, BookingStatus};
use crate::errors::DomainError;

/// Repository trait for Booking entity persistence operations
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Find a booking by its unique identifier
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, DomainError>;

    /// Atomically check availability and insert a PENDING booking
    ///
    /// The implementation MUST serialize the peak-reservation check and the
    /// insert against concurrent calls for the same item: a relational store
    /// does this with a transaction plus `SELECT ... FOR UPDATE` on the item
    /// row (or a serializable transaction with retry); the in-memory mock
    /// holds the store write lock across check and insert.
    ///
    /// # Arguments
    /// * `booking` - The PENDING booking to insert
    /// * `total_quantity` - Snapshot of the item's on-hand quantity. A store
    ///   that holds the item row under the serialization lock re-reads the
    ///   authoritative quantity there instead of trusting this snapshot.
    ///
    /// # Returns
    /// * `Ok(Booking)` - The inserted booking
    /// * `Err(DomainError::Booking(InsufficientInventory))` - Requested
    ///   quantity exceeds what is free on some day of the range
    /// * `Err(DomainError::Conflict)` - Store serialization failure; safe to
    ///   retry
    async fn insert_if_available(
        &self,
        booking: Booking,
        total_quantity: u32,
    ) -> Result<Booking, DomainError>;

    /// Atomically re-check availability and update an existing booking
    ///
    /// Same serialization contract as `insert_if_available`, with the
    /// booking's own current reservation excluded from the peak computation.
    /// Used when a booking's range changes, e.g. an extension.
    ///
    /// # Returns
    /// * `Ok(Booking)` - The updated booking
    /// * `Err(DomainError::Booking(InsufficientInventory))` - The new range
    ///   does not fit alongside the other active bookings
    /// * `Err(DomainError::NotFound)` - No stored booking with this id
    /// * `Err(DomainError::Conflict)` - Store serialization failure; safe to
    ///   retry
    async fn update_if_available(
        &self,
        booking: Booking,
        total_quantity: u32,
    ) -> Result<Booking, DomainError>;

    /// Atomically transition a PENDING booking out of its hold
    ///
    /// Confirms the booking if its hold is still live at `now`; a lapsed
    /// hold is rewritten to CANCELLED and surfaces as `Expired`. The status
    /// decision MUST be serialized against `insert_if_available` for the
    /// same item: deciding on a stale snapshot lets a confirm land on a hold
    /// a concurrent insert already treated as lapsed, overbooking the item.
    ///
    /// # Returns
    /// * `Ok(Booking)` - The booking, now CONFIRMED
    /// * `Err(DomainError::Booking(Expired))` - Hold lapsed; row rewritten
    ///   to CANCELLED
    /// * `Err(DomainError::Booking(InvalidState))` - Not PENDING
    async fn confirm_pending(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Booking, DomainError>;

    /// Rewrite a PENDING booking to CANCELLED if its hold lapsed before `now`
    ///
    /// Conditional on the stored row still being a lapsed hold at write
    /// time, so a concurrently confirmed booking is never overwritten.
    ///
    /// # Returns
    /// Whether the row was rewritten
    async fn cancel_if_lapsed(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, DomainError>;

    /// Update an existing booking (status transitions)
    async fn update(&self, booking: Booking) -> Result<Booking, DomainError>;

    /// Find active bookings for an item whose range intersects the given one
    ///
    /// Active means CONFIRMED, or PENDING with `expires_at` after `now`.
    /// Lapsed holds, CANCELLED and COMPLETED bookings are never returned.
    async fn find_overlapping(
        &self,
        item_id: Uuid,
        range: DateRange,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, DomainError>;

    /// List every booking (admin view)
    async fn list_all(&self) -> Result<Vec<Booking>, DomainError>;

    /// List bookings made by a renter, newest first
    async fn list_by_renter(&self, renter_id: Uuid) -> Result<Vec<Booking>, DomainError>;

    /// List bookings for an item, newest first
    async fn list_by_item(&self, item_id: Uuid) -> Result<Vec<Booking>, DomainError>;

    /// List bookings in a given status, newest first
    async fn list_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>, DomainError>;

    /// Find PENDING bookings whose hold lapsed before `now`, oldest first
    ///
    /// Used by the expiry sweep to rewrite lapsed holds to CANCELLED.
    async fn find_expired_pending(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Booking>, DomainError>;
}
