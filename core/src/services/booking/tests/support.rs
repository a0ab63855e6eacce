//! Shared fixtures for booking service tests

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use gs_shared::types::DateRange;

use crate::domain::entities::item::Item;
use crate::repositories::{ItemRepository, MockBookingRepository, MockItemRepository};
use crate::services::booking::{BookingService, BookingServiceConfig};

pub type TestService = BookingService<MockBookingRepository, MockItemRepository>;

pub struct Fixture {
    pub service: Arc<TestService>,
    pub bookings: Arc<MockBookingRepository>,
    pub items: Arc<MockItemRepository>,
}

/// Build a service over fresh mock repositories
pub fn fixture() -> Fixture {
    fixture_with_config(BookingServiceConfig::default())
}

pub fn fixture_with_config(config: BookingServiceConfig) -> Fixture {
    let bookings = Arc::new(MockBookingRepository::new());
    let items = Arc::new(MockItemRepository::new());
    let service = Arc::new(BookingService::new(
        Arc::clone(&bookings),
        Arc::clone(&items),
        config,
    ));
    Fixture {
        service,
        bookings,
        items,
    }
}

/// Seed an item with the given on-hand quantity at 20.00 per day
pub async fn seed_item(items: &MockItemRepository, owner_id: Uuid, total_quantity: u32) -> Item {
    let item = Item::new(
        owner_id,
        "Cargo trailer",
        "6x4 box trailer with ramp",
        "hauling",
        Decimal::new(2000, 2),
        total_quantity,
    );
    items.create(item).await.unwrap()
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Future date range `[today + start_offset, today + end_offset)`
pub fn future_range(start_offset: u64, end_offset: u64) -> DateRange {
    DateRange::new(
        today() + Days::new(start_offset),
        today() + Days::new(end_offset),
    )
    .unwrap()
}
