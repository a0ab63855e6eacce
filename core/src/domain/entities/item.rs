//! Item entity representing a rentable unit of equipment.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Item entity for rental inventory
///
/// The availability engine only cares about `id`, `price_per_day` and
/// `total_quantity`; the remaining attributes are marketplace metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier for the item
    pub id: Uuid,

    /// User who owns and lists the item
    pub owner_id: Uuid,

    /// Listing title
    pub title: String,

    /// Listing description
    pub description: String,

    /// Category label (opaque to the engine)
    pub category: String,

    /// Rental rate per day (positive)
    pub price_per_day: Decimal,

    /// Total on-hand units available for rent (positive)
    pub total_quantity: u32,

    /// Timestamp when the item was listed
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last update
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Create a new item listing
    pub fn new(
        owner_id: Uuid,
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        price_per_day: Decimal,
        total_quantity: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: title.into(),
            description: description.into(),
            category: category.into(),
            price_per_day,
            total_quantity,
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the daily rate, bumping `updated_at`
    pub fn set_price_per_day(&mut self, rate: Decimal) {
        self.price_per_day = rate;
        self.updated_at = Utc::now();
    }

    /// Update the on-hand quantity, bumping `updated_at`
    pub fn set_total_quantity(&mut self, quantity: u32) {
        self.total_quantity = quantity;
        self.updated_at = Utc::now();
    }
}
