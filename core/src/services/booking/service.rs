//! Booking availability engine.
//!
//! Answers "can item X provide quantity Q for range [start, end)?" and turns
//! a "yes" into a time-limited PENDING hold without racing concurrent
//! requests for the same item. The atomic check-then-insert lives behind
//! `BookingRepository::insert_if_available`; this service owns validation,
//! pricing, authorization, state transitions, and bounded conflict retry.

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use gs_shared::types::{DateRange, PaginatedResponse, Pagination};

use crate::domain::entities::booking::{
    Booking, BookingStatus, MAX_QUANTITY, MIN_QUANTITY,
};
use crate::domain::entities::item::Item;
use crate::domain::value_objects::{Actor, AvailabilityQuote, BookingStatistics};
use crate::errors::{BookingError, DomainError, DomainResult, ValidationError};
use crate::repositories::{BookingRepository, ItemRepository};

use super::availability::peak_reserved;
use super::config::BookingServiceConfig;

/// Booking service for availability checks and reservation lifecycle
pub struct BookingService<B, I>
where
    B: BookingRepository,
    I: ItemRepository,
{
    /// Booking repository for reservation persistence
    booking_repository: Arc<B>,
    /// Item repository for inventory and pricing lookups
    item_repository: Arc<I>,
    /// Service configuration
    config: BookingServiceConfig,
}

impl<B, I> BookingService<B, I>
where
    B: BookingRepository,
    I: ItemRepository,
{
    /// Create a new booking service
    pub fn new(
        booking_repository: Arc<B>,
        item_repository: Arc<I>,
        config: BookingServiceConfig,
    ) -> Self {
        Self {
            booking_repository,
            item_repository,
            config,
        }
    }

    /// Check whether an item can provide a quantity over a date range
    ///
    /// Read-only; safe to call repeatedly. `exclude` lets a booking being
    /// extended ignore its own prior reservation. Past ranges are allowed
    /// here for historical queries; only reservation creation rejects them.
    pub async fn check_availability(
        &self,
        item_id: Uuid,
        range: DateRange,
        quantity: u32,
        exclude: Option<Uuid>,
    ) -> DomainResult<AvailabilityQuote> {
        Self::validate_quantity(quantity)?;
        let item = self.find_item(item_id).await?;

        let now = Utc::now();
        let overlapping = self
            .booking_repository
            .find_overlapping(item_id, range, now)
            .await?;
        let peak = peak_reserved(&overlapping, &range, exclude, now);
        let available_quantity = item.total_quantity.saturating_sub(peak.total);

        Ok(AvailabilityQuote {
            is_available: available_quantity >= quantity,
            available_quantity,
            pending_reserved: peak.pending,
            confirmed_reserved: peak.confirmed,
        })
    }

    /// Create a PENDING hold for an item
    ///
    /// Validates input, prices the rental, and delegates the atomic
    /// check-then-insert to the repository. Store serialization conflicts
    /// are retried up to the configured bound before surfacing.
    pub async fn create_booking(
        &self,
        actor: &Actor,
        item_id: Uuid,
        range: DateRange,
        quantity: u32,
    ) -> DomainResult<Booking> {
        if !actor.verified {
            return Err(BookingError::RenterNotVerified.into());
        }
        Self::validate_quantity(quantity)?;
        if range.start() < Utc::now().date_naive() {
            return Err(ValidationError::StartDateInPast.into());
        }

        let item = self.find_item(item_id).await?;
        let total_price = Booking::price_total(item.price_per_day, &range, quantity);
        let booking = Booking::new_with_hold(
            item_id,
            actor.id,
            range,
            quantity,
            total_price,
            self.config.hold_minutes,
        );

        let mut attempts = 0;
        let booking = loop {
            match self
                .booking_repository
                .insert_if_available(booking.clone(), item.total_quantity)
                .await
            {
                Err(DomainError::Conflict { message })
                    if attempts < self.config.max_conflict_retries =>
                {
                    attempts += 1;
                    warn!(
                        "Insert conflict for item {} (attempt {}/{}): {}",
                        item_id, attempts, self.config.max_conflict_retries, message
                    );
                }
                other => break other?,
            }
        };

        info!(
            "Created hold {} on item {} for {} unit(s) over {}, expires {}",
            booking.id, item_id, quantity, booking.range, booking.expires_at
        );
        Ok(booking)
    }

    /// Confirm a PENDING booking before its hold lapses
    ///
    /// The expiry check and the PENDING -> CONFIRMED write happen atomically
    /// in the repository, serialized with concurrent hold creation for the
    /// same item. A lapsed hold is rewritten to CANCELLED and surfaces as
    /// `Expired`, so the row never presents as PENDING again.
    pub async fn confirm_booking(&self, booking_id: Uuid, actor: &Actor) -> DomainResult<Booking> {
        let booking = self.find_booking(booking_id).await?;
        self.authorize(actor, &booking).await?;

        match self
            .booking_repository
            .confirm_pending(booking_id, Utc::now())
            .await
        {
            Ok(booking) => {
                info!("Booking {} confirmed", booking_id);
                Ok(booking)
            }
            Err(err @ DomainError::Booking(BookingError::Expired)) => {
                info!(
                    "Hold {} lapsed before confirmation; rewritten to cancelled",
                    booking_id
                );
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Cancel a PENDING or CONFIRMED booking
    ///
    /// Cancelling an already-cancelled booking is an idempotent success.
    pub async fn cancel_booking(&self, booking_id: Uuid, actor: &Actor) -> DomainResult<Booking> {
        let mut booking = self.find_booking(booking_id).await?;
        self.authorize(actor, &booking).await?;

        let already_cancelled = booking.status == BookingStatus::Cancelled;
        booking.cancel().map_err(DomainError::from)?;
        if already_cancelled {
            return Ok(booking);
        }

        let booking = self.booking_repository.update(booking).await?;
        info!("Booking {} cancelled", booking_id);
        Ok(booking)
    }

    /// Mark a CONFIRMED booking as COMPLETED after the rental period
    pub async fn complete_booking(&self, booking_id: Uuid, actor: &Actor) -> DomainResult<Booking> {
        let mut booking = self.find_booking(booking_id).await?;
        self.authorize(actor, &booking).await?;

        booking.complete().map_err(DomainError::from)?;
        let booking = self.booking_repository.update(booking).await?;
        info!("Booking {} completed", booking_id);
        Ok(booking)
    }

    /// Extend a booking's rental period to a later end date
    ///
    /// Re-checks availability for the widened range with the booking's own
    /// reservation excluded, then reprices the whole rental at the item's
    /// current daily rate. CONFIRMED bookings and live PENDING holds may be
    /// extended; the check-and-update is atomic in the repository.
    pub async fn extend_booking(
        &self,
        booking_id: Uuid,
        new_end: NaiveDate,
        actor: &Actor,
    ) -> DomainResult<Booking> {
        let mut booking = self.find_booking(booking_id).await?;
        self.authorize(actor, &booking).await?;

        match booking.status {
            BookingStatus::Pending if booking.is_expired() => {
                return Err(BookingError::Expired.into());
            }
            BookingStatus::Pending | BookingStatus::Confirmed => {}
            current => {
                return Err(BookingError::InvalidState {
                    current,
                    action: "extend",
                }
                .into());
            }
        }
        if new_end <= booking.range.end() {
            return Err(ValidationError::EndDateNotExtended.into());
        }

        let new_range =
            DateRange::new(booking.range.start(), new_end).map_err(ValidationError::from)?;
        let item = self.find_item(booking.item_id).await?;
        booking.range = new_range;
        booking.total_price = Booking::price_total(item.price_per_day, &new_range, booking.quantity);

        let mut attempts = 0;
        let booking = loop {
            match self
                .booking_repository
                .update_if_available(booking.clone(), item.total_quantity)
                .await
            {
                Err(DomainError::Conflict { message })
                    if attempts < self.config.max_conflict_retries =>
                {
                    attempts += 1;
                    warn!(
                        "Extend conflict for booking {} (attempt {}/{}): {}",
                        booking_id, attempts, self.config.max_conflict_retries, message
                    );
                }
                other => break other?,
            }
        };

        info!("Booking {} extended to {}", booking_id, booking.range);
        Ok(booking)
    }

    /// List bookings visible to the caller, newest first
    ///
    /// Admins see every booking; members see only their own. This is a
    /// read-time filter over one dataset, not separate datasets.
    pub async fn list_bookings(
        &self,
        actor: &Actor,
        pagination: Pagination,
    ) -> DomainResult<PaginatedResponse<Booking>> {
        let bookings = if actor.is_admin() {
            self.booking_repository.list_all().await?
        } else {
            self.booking_repository.list_by_renter(actor.id).await?
        };

        let total = bookings.len() as u64;
        let page = bookings
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect();
        Ok(PaginatedResponse::new(page, pagination, total))
    }

    /// List bookings for an item (item owner or admin only)
    pub async fn bookings_for_item(
        &self,
        actor: &Actor,
        item_id: Uuid,
    ) -> DomainResult<Vec<Booking>> {
        let item = self.find_item(item_id).await?;
        if !actor.is_admin() && actor.id != item.owner_id {
            return Err(DomainError::Unauthorized);
        }
        self.booking_repository.list_by_item(item_id).await
    }

    /// CONFIRMED bookings starting within the next `days_ahead` days
    pub async fn upcoming_bookings(&self, days_ahead: Option<i64>) -> DomainResult<Vec<Booking>> {
        let window = days_ahead.unwrap_or(self.config.upcoming_window_days);
        let today = Utc::now().date_naive();
        let horizon = today + Days::new(window.max(0) as u64);

        let mut confirmed = self
            .booking_repository
            .list_by_status(BookingStatus::Confirmed)
            .await?;
        confirmed.retain(|booking| {
            booking.range.start() >= today && booking.range.start() <= horizon
        });
        confirmed.sort_by_key(|booking| booking.range.start());
        Ok(confirmed)
    }

    /// Aggregate booking counts and completed revenue
    pub async fn booking_statistics(&self) -> DomainResult<BookingStatistics> {
        let bookings = self.booking_repository.list_all().await?;
        let mut stats = BookingStatistics {
            total: bookings.len(),
            ..Default::default()
        };

        for booking in &bookings {
            match booking.status {
                BookingStatus::Pending => stats.pending += 1,
                BookingStatus::Confirmed => stats.confirmed += 1,
                BookingStatus::Completed => {
                    stats.completed += 1;
                    stats.total_revenue += booking.total_price;
                }
                BookingStatus::Cancelled => stats.cancelled += 1,
            }
        }
        Ok(stats)
    }

    /// Total revenue from COMPLETED bookings across an owner's items
    pub async fn owner_revenue(&self, owner_id: Uuid) -> DomainResult<Decimal> {
        let items = self.item_repository.list_by_owner(owner_id).await?;
        let mut revenue = Decimal::ZERO;
        for item in items {
            let bookings = self.booking_repository.list_by_item(item.id).await?;
            revenue += bookings
                .iter()
                .filter(|booking| booking.status == BookingStatus::Completed)
                .map(|booking| booking.total_price)
                .sum::<Decimal>();
        }
        Ok(revenue)
    }

    /// Rewrite lapsed PENDING holds to CANCELLED
    ///
    /// Lapsed holds already stop reserving inventory at read time; this
    /// sweep makes the status field agree with the inventory math so a
    /// client never observes a dead hold as PENDING indefinitely.
    ///
    /// # Returns
    /// Number of holds rewritten (at most `limit`)
    pub async fn expire_stale_pending(&self, limit: usize) -> DomainResult<usize> {
        let now = Utc::now();
        let expired = self
            .booking_repository
            .find_expired_pending(now, limit)
            .await?;

        let mut count = 0;
        for booking in expired {
            // Conditional rewrite: a hold confirmed since the read above is
            // left alone
            if self.booking_repository.cancel_if_lapsed(booking.id, now).await? {
                count += 1;
            }
        }

        if count > 0 {
            info!("Rewrote {} lapsed hold(s) to cancelled", count);
        }
        Ok(count)
    }

    fn validate_quantity(quantity: u32) -> Result<(), ValidationError> {
        if !(MIN_QUANTITY..=MAX_QUANTITY).contains(&quantity) {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: MIN_QUANTITY.to_string(),
                max: MAX_QUANTITY.to_string(),
            });
        }
        Ok(())
    }

    async fn find_item(&self, item_id: Uuid) -> DomainResult<Item> {
        self.item_repository
            .find_by_id(item_id)
            .await?
            .ok_or_else(|| DomainError::item_not_found(item_id))
    }

    async fn find_booking(&self, booking_id: Uuid) -> DomainResult<Booking> {
        self.booking_repository
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| DomainError::booking_not_found(booking_id))
    }

    /// Renter, item owner, and admin may manage a booking
    async fn authorize(&self, actor: &Actor, booking: &Booking) -> DomainResult<()> {
        if actor.is_admin() || actor.id == booking.renter_id {
            return Ok(());
        }
        if let Some(item) = self.item_repository.find_by_id(booking.item_id).await? {
            if actor.id == item.owner_id {
                return Ok(());
            }
        }
        Err(DomainError::Unauthorized)
    }
}
