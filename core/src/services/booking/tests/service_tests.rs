//! Unit tests for the booking service

use chrono::{Days, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use gs_shared::types::{DateRange, Pagination};

use crate::domain::entities::booking::{Booking, BookingStatus, DEFAULT_HOLD_MINUTES};
use crate::domain::value_objects::Actor;
use crate::errors::{BookingError, DomainError, ValidationError};
use crate::repositories::BookingRepository;

use super::support::*;

#[tokio::test]
async fn test_create_booking_returns_pending_hold() {
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let item = seed_item(&fx.items, Uuid::new_v4(), 3).await;

    let booking = fx
        .service
        .create_booking(&renter, item.id, future_range(1, 4), 2)
        .await
        .unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.quantity, 2);
    // 20.00/day * 3 days * 2 units
    assert_eq!(booking.total_price, Decimal::new(12000, 2));
    assert_eq!(
        booking.expires_at,
        booking.created_at + Duration::minutes(DEFAULT_HOLD_MINUTES)
    );
}

#[tokio::test]
async fn test_create_booking_rejects_unverified_renter() {
    let fx = fixture();
    let renter = Actor::unverified(Uuid::new_v4());
    let item = seed_item(&fx.items, Uuid::new_v4(), 3).await;

    let err = fx
        .service
        .create_booking(&renter, item.id, future_range(1, 4), 1)
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::Booking(BookingError::RenterNotVerified));
}

#[tokio::test]
async fn test_create_booking_rejects_past_start_date() {
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let item = seed_item(&fx.items, Uuid::new_v4(), 3).await;
    let past = DateRange::new(today() - Days::new(2), today() + Days::new(1)).unwrap();

    let err = fx
        .service
        .create_booking(&renter, item.id, past, 1)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DomainError::Validation(ValidationError::StartDateInPast)
    );
}

#[tokio::test]
async fn test_create_booking_unknown_item() {
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());

    let err = fx
        .service
        .create_booking(&renter, Uuid::new_v4(), future_range(1, 2), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn test_quantity_boundaries() {
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let item = seed_item(&fx.items, Uuid::new_v4(), 10).await;

    for quantity in [0u32, 11] {
        let err = fx
            .service
            .create_booking(&renter, item.id, future_range(1, 2), quantity)
            .await
            .unwrap_err();
        assert!(
            matches!(
                err,
                DomainError::Validation(ValidationError::OutOfRange { .. })
            ),
            "quantity {} should be rejected",
            quantity
        );
    }

    // 1 and 10 are both accepted (inventory permits: disjoint ranges)
    fx.service
        .create_booking(&renter, item.id, future_range(1, 2), 1)
        .await
        .unwrap();
    fx.service
        .create_booking(&renter, item.id, future_range(2, 3), 10)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_one_day_rental_accepted() {
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let item = seed_item(&fx.items, Uuid::new_v4(), 1).await;

    let booking = fx
        .service
        .create_booking(&renter, item.id, future_range(1, 2), 1)
        .await
        .unwrap();
    assert_eq!(booking.duration_days(), 1);
}

#[tokio::test]
async fn test_full_inventory_then_overlap_rejected() {
    // Scenario A: quantity 5 fills the item; any overlapping unit fails
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let item = seed_item(&fx.items, Uuid::new_v4(), 5).await;

    fx.service
        .create_booking(&renter, item.id, future_range(1, 3), 5)
        .await
        .unwrap();

    let err = fx
        .service
        .create_booking(&renter, item.id, future_range(2, 4), 1)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DomainError::Booking(BookingError::InsufficientInventory {
            requested: 1,
            available: 0,
        })
    );

    // A non-overlapping range still succeeds
    fx.service
        .create_booking(&renter, item.id, future_range(3, 5), 5)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_check_availability_reports_components() {
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let item = seed_item(&fx.items, Uuid::new_v4(), 5).await;

    let hold = fx
        .service
        .create_booking(&renter, item.id, future_range(1, 4), 2)
        .await
        .unwrap();
    fx.service
        .confirm_booking(hold.id, &renter)
        .await
        .unwrap();
    fx.service
        .create_booking(&renter, item.id, future_range(2, 5), 1)
        .await
        .unwrap();

    let quote = fx
        .service
        .check_availability(item.id, future_range(1, 5), 2, None)
        .await
        .unwrap();

    assert!(quote.is_available);
    assert_eq!(quote.available_quantity, 2);
    assert_eq!(quote.confirmed_reserved, 2);
    assert_eq!(quote.pending_reserved, 1);
}

#[tokio::test]
async fn test_check_availability_excludes_own_booking() {
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let item = seed_item(&fx.items, Uuid::new_v4(), 1).await;

    let booking = fx
        .service
        .create_booking(&renter, item.id, future_range(1, 3), 1)
        .await
        .unwrap();

    let blocked = fx
        .service
        .check_availability(item.id, future_range(1, 3), 1, None)
        .await
        .unwrap();
    assert!(!blocked.is_available);

    // Extending the same booking ignores its own reservation
    let extending = fx
        .service
        .check_availability(item.id, future_range(1, 5), 1, Some(booking.id))
        .await
        .unwrap();
    assert!(extending.is_available);
}

#[tokio::test]
async fn test_lapsed_hold_frees_inventory() {
    let fx = fixture();
    let item = seed_item(&fx.items, Uuid::new_v4(), 2).await;

    // A hold that lapsed one second ago must not count as pending
    let mut lapsed = Booking::new(
        item.id,
        Uuid::new_v4(),
        future_range(1, 3),
        2,
        Decimal::ONE,
    );
    lapsed.expires_at = Utc::now() - Duration::seconds(1);
    fx.bookings.insert_raw(lapsed).await;

    let quote = fx
        .service
        .check_availability(item.id, future_range(1, 3), 2, None)
        .await
        .unwrap();
    assert!(quote.is_available);
    assert_eq!(quote.pending_reserved, 0);
    assert_eq!(quote.available_quantity, 2);
}

#[tokio::test]
async fn test_confirm_within_hold_window() {
    // Scenario C, happy path
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let item = seed_item(&fx.items, Uuid::new_v4(), 1).await;

    let hold = fx
        .service
        .create_booking(&renter, item.id, future_range(1, 2), 1)
        .await
        .unwrap();
    let confirmed = fx.service.confirm_booking(hold.id, &renter).await.unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn test_confirm_after_lapse_rewrites_to_cancelled() {
    // Scenario C, expired path: the lapsed hold surfaces Expired and the
    // stored row is rewritten so it never presents as PENDING again
    let fx = fixture();
    let renter_id = Uuid::new_v4();
    let renter = Actor::member(renter_id);
    let item = seed_item(&fx.items, Uuid::new_v4(), 1).await;

    let mut hold = Booking::new(item.id, renter_id, future_range(1, 2), 1, Decimal::ONE);
    hold.expires_at = Utc::now() - Duration::minutes(1);
    let hold_id = hold.id;
    fx.bookings.insert_raw(hold).await;

    let err = fx.service.confirm_booking(hold_id, &renter).await.unwrap_err();
    assert_eq!(err, DomainError::Booking(BookingError::Expired));

    let stored = fx.bookings.find_by_id(hold_id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn test_confirm_cannot_reclaim_a_unit_taken_after_lapse() {
    // Once a lapsed hold's unit has been handed to a new booking, a late
    // confirm of that hold must fail instead of overbooking the item
    let fx = fixture();
    let renter_id = Uuid::new_v4();
    let renter = Actor::member(renter_id);
    let item = seed_item(&fx.items, Uuid::new_v4(), 1).await;

    let mut hold = Booking::new(item.id, renter_id, future_range(1, 3), 1, Decimal::ONE);
    hold.expires_at = Utc::now() - Duration::seconds(1);
    let hold_id = hold.id;
    fx.bookings.insert_raw(hold).await;

    // The lapse freed the only unit, so a new renter takes it
    let taken = fx
        .service
        .create_booking(&Actor::member(Uuid::new_v4()), item.id, future_range(1, 3), 1)
        .await
        .unwrap();

    let err = fx.service.confirm_booking(hold_id, &renter).await.unwrap_err();
    assert_eq!(err, DomainError::Booking(BookingError::Expired));

    // Exactly one active reservation for the unit remains
    let now = Utc::now();
    let active: Vec<Booking> = fx
        .bookings
        .all()
        .await
        .into_iter()
        .filter(|booking| booking.is_active_at(now))
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, taken.id);
}

#[tokio::test]
async fn test_confirm_requires_authorization() {
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let stranger = Actor::member(Uuid::new_v4());
    let owner_id = Uuid::new_v4();
    let item = seed_item(&fx.items, owner_id, 1).await;

    let hold = fx
        .service
        .create_booking(&renter, item.id, future_range(1, 2), 1)
        .await
        .unwrap();

    let err = fx
        .service
        .confirm_booking(hold.id, &stranger)
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::Unauthorized);

    // The item owner may confirm
    let confirmed = fx
        .service
        .confirm_booking(hold.id, &Actor::member(owner_id))
        .await
        .unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn test_cancel_is_idempotent() {
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let item = seed_item(&fx.items, Uuid::new_v4(), 1).await;

    let hold = fx
        .service
        .create_booking(&renter, item.id, future_range(1, 2), 1)
        .await
        .unwrap();

    let first = fx.service.cancel_booking(hold.id, &renter).await.unwrap();
    assert_eq!(first.status, BookingStatus::Cancelled);

    let second = fx.service.cancel_booking(hold.id, &renter).await.unwrap();
    assert_eq!(second.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn test_cancel_completed_is_invalid_state() {
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let item = seed_item(&fx.items, Uuid::new_v4(), 1).await;

    let hold = fx
        .service
        .create_booking(&renter, item.id, future_range(1, 2), 1)
        .await
        .unwrap();
    fx.service.confirm_booking(hold.id, &renter).await.unwrap();
    fx.service.complete_booking(hold.id, &renter).await.unwrap();

    let err = fx.service.cancel_booking(hold.id, &renter).await.unwrap_err();
    assert_eq!(
        err,
        DomainError::Booking(BookingError::InvalidState {
            current: BookingStatus::Completed,
            action: "cancel",
        })
    );
}

#[tokio::test]
async fn test_cancelled_booking_frees_inventory() {
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let item = seed_item(&fx.items, Uuid::new_v4(), 1).await;

    let hold = fx
        .service
        .create_booking(&renter, item.id, future_range(1, 3), 1)
        .await
        .unwrap();
    fx.service.cancel_booking(hold.id, &renter).await.unwrap();

    // The freed unit is immediately reservable again
    fx.service
        .create_booking(&renter, item.id, future_range(1, 3), 1)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_bookings_filters_by_role() {
    // Scenario D: admin sees all, member sees own
    let fx = fixture();
    let alice = Actor::member(Uuid::new_v4());
    let bob = Actor::member(Uuid::new_v4());
    let admin = Actor::admin(Uuid::new_v4());
    let item = seed_item(&fx.items, Uuid::new_v4(), 10).await;

    fx.service
        .create_booking(&alice, item.id, future_range(1, 3), 2)
        .await
        .unwrap();
    fx.service
        .create_booking(&bob, item.id, future_range(1, 3), 2)
        .await
        .unwrap();

    let all = fx
        .service
        .list_bookings(&admin, Pagination::default())
        .await
        .unwrap();
    assert_eq!(all.total, 2);
    assert_eq!(all.data.len(), 2);

    let own = fx
        .service
        .list_bookings(&alice, Pagination::default())
        .await
        .unwrap();
    assert_eq!(own.total, 1);
    assert_eq!(own.data[0].renter_id, alice.id);
}

#[tokio::test]
async fn test_list_bookings_pages_through_results() {
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let item = seed_item(&fx.items, Uuid::new_v4(), 10).await;

    for offset in 1..=3 {
        fx.service
            .create_booking(&renter, item.id, future_range(offset, offset + 1), 1)
            .await
            .unwrap();
    }

    let first = fx
        .service
        .list_bookings(&renter, Pagination::new(1, 2))
        .await
        .unwrap();
    assert_eq!(first.data.len(), 2);
    assert_eq!(first.total, 3);
    assert_eq!(first.total_pages, 2);

    let last = fx
        .service
        .list_bookings(&renter, Pagination::new(2, 2))
        .await
        .unwrap();
    assert_eq!(last.data.len(), 1);
    assert_eq!(last.total, 3);
}

#[tokio::test]
async fn test_bookings_for_item_restricted_to_owner() {
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let owner_id = Uuid::new_v4();
    let item = seed_item(&fx.items, owner_id, 2).await;

    fx.service
        .create_booking(&renter, item.id, future_range(1, 3), 1)
        .await
        .unwrap();

    let err = fx
        .service
        .bookings_for_item(&renter, item.id)
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::Unauthorized);

    let listed = fx
        .service
        .bookings_for_item(&Actor::member(owner_id), item.id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_conflict_retry_succeeds_within_bound() {
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let item = seed_item(&fx.items, Uuid::new_v4(), 1).await;

    fx.bookings.fail_next_writes_with_conflict(2).await;
    let booking = fx
        .service
        .create_booking(&renter, item.id, future_range(1, 2), 1)
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);
}

#[tokio::test]
async fn test_conflict_surfaces_past_retry_bound() {
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let item = seed_item(&fx.items, Uuid::new_v4(), 1).await;

    // Default bound is 3 retries; 4 consecutive conflicts exhaust it
    fx.bookings.fail_next_writes_with_conflict(10).await;
    let err = fx
        .service
        .create_booking(&renter, item.id, future_range(1, 2), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict { .. }));
}

#[tokio::test]
async fn test_extend_booking_reprices_full_duration() {
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let item = seed_item(&fx.items, Uuid::new_v4(), 1).await;

    let booking = fx
        .service
        .create_booking(&renter, item.id, future_range(1, 3), 1)
        .await
        .unwrap();
    assert_eq!(booking.total_price, Decimal::new(4000, 2));

    let extended = fx
        .service
        .extend_booking(booking.id, today() + Days::new(5), &renter)
        .await
        .unwrap();
    assert_eq!(extended.range, future_range(1, 5));
    // 20.00/day * 4 days * 1 unit
    assert_eq!(extended.total_price, Decimal::new(8000, 2));
    assert_eq!(extended.status, BookingStatus::Pending);
}

#[tokio::test]
async fn test_extend_blocked_by_other_booking() {
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let item = seed_item(&fx.items, Uuid::new_v4(), 1).await;

    let booking = fx
        .service
        .create_booking(&renter, item.id, future_range(1, 3), 1)
        .await
        .unwrap();
    fx.service
        .create_booking(&Actor::member(Uuid::new_v4()), item.id, future_range(4, 6), 1)
        .await
        .unwrap();

    let err = fx
        .service
        .extend_booking(booking.id, today() + Days::new(5), &renter)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DomainError::Booking(BookingError::InsufficientInventory {
            requested: 1,
            available: 0,
        })
    );

    // The stored booking keeps its original range and price
    let stored = fx.bookings.find_by_id(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.range, future_range(1, 3));
    assert_eq!(stored.total_price, booking.total_price);
}

#[tokio::test]
async fn test_extend_requires_a_later_end_date() {
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let item = seed_item(&fx.items, Uuid::new_v4(), 1).await;

    let booking = fx
        .service
        .create_booking(&renter, item.id, future_range(1, 3), 1)
        .await
        .unwrap();

    for end_offset in [2u64, 3] {
        let err = fx
            .service
            .extend_booking(booking.id, today() + Days::new(end_offset), &renter)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::Validation(ValidationError::EndDateNotExtended)
        );
    }
}

#[tokio::test]
async fn test_extend_rejects_finished_and_lapsed_bookings() {
    let fx = fixture();
    let renter_id = Uuid::new_v4();
    let renter = Actor::member(renter_id);
    let item = seed_item(&fx.items, Uuid::new_v4(), 2).await;

    let cancelled = fx
        .service
        .create_booking(&renter, item.id, future_range(1, 3), 1)
        .await
        .unwrap();
    fx.service.cancel_booking(cancelled.id, &renter).await.unwrap();
    let err = fx
        .service
        .extend_booking(cancelled.id, today() + Days::new(5), &renter)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DomainError::Booking(BookingError::InvalidState {
            current: BookingStatus::Cancelled,
            action: "extend",
        })
    );

    let mut lapsed = Booking::new(item.id, renter_id, future_range(1, 3), 1, Decimal::ONE);
    lapsed.expires_at = Utc::now() - Duration::minutes(1);
    let lapsed_id = lapsed.id;
    fx.bookings.insert_raw(lapsed).await;
    let err = fx
        .service
        .extend_booking(lapsed_id, today() + Days::new(5), &renter)
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::Booking(BookingError::Expired));
}

#[tokio::test]
async fn test_extend_requires_authorization() {
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let stranger = Actor::member(Uuid::new_v4());
    let item = seed_item(&fx.items, Uuid::new_v4(), 1).await;

    let booking = fx
        .service
        .create_booking(&renter, item.id, future_range(1, 3), 1)
        .await
        .unwrap();

    let err = fx
        .service
        .extend_booking(booking.id, today() + Days::new(5), &stranger)
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::Unauthorized);
}

#[tokio::test]
async fn test_booking_statistics_and_revenue() {
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let owner_id = Uuid::new_v4();
    let item = seed_item(&fx.items, owner_id, 10).await;

    let completed = fx
        .service
        .create_booking(&renter, item.id, future_range(1, 3), 1)
        .await
        .unwrap();
    fx.service.confirm_booking(completed.id, &renter).await.unwrap();
    fx.service.complete_booking(completed.id, &renter).await.unwrap();

    let cancelled = fx
        .service
        .create_booking(&renter, item.id, future_range(1, 3), 1)
        .await
        .unwrap();
    fx.service.cancel_booking(cancelled.id, &renter).await.unwrap();

    fx.service
        .create_booking(&renter, item.id, future_range(4, 6), 2)
        .await
        .unwrap();

    let stats = fx.service.booking_statistics().await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.cancelled, 1);
    assert_eq!(stats.pending, 1);
    // 20.00/day * 2 days * 1 unit
    assert_eq!(stats.total_revenue, Decimal::new(4000, 2));

    let revenue = fx.service.owner_revenue(owner_id).await.unwrap();
    assert_eq!(revenue, Decimal::new(4000, 2));
    let nobody = fx.service.owner_revenue(Uuid::new_v4()).await.unwrap();
    assert_eq!(nobody, Decimal::ZERO);
}

#[tokio::test]
async fn test_upcoming_bookings_window() {
    let fx = fixture();
    let renter = Actor::member(Uuid::new_v4());
    let item = seed_item(&fx.items, Uuid::new_v4(), 10).await;

    let soon = fx
        .service
        .create_booking(&renter, item.id, future_range(2, 4), 1)
        .await
        .unwrap();
    fx.service.confirm_booking(soon.id, &renter).await.unwrap();

    let far = fx
        .service
        .create_booking(&renter, item.id, future_range(20, 22), 1)
        .await
        .unwrap();
    fx.service.confirm_booking(far.id, &renter).await.unwrap();

    // Still pending, so not upcoming
    fx.service
        .create_booking(&renter, item.id, future_range(3, 5), 1)
        .await
        .unwrap();

    let upcoming = fx.service.upcoming_bookings(None).await.unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].id, soon.id);

    let wider = fx.service.upcoming_bookings(Some(30)).await.unwrap();
    assert_eq!(wider.len(), 2);
}
