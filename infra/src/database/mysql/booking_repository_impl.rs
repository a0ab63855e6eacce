//! MySQL implementation of the BookingRepository trait.
//!
//! The availability-checked writes (`insert_if_available`,
//! `update_if_available`) and `confirm_pending` all run in a transaction
//! that first locks the item row with `SELECT ... FOR UPDATE`, so the
//! peak-reservation check, the hold-expiry decision, and the write are
//! serialized against concurrent calls for the same item. Lock order is
//! always items before bookings. Deadlocks and lock wait timeouts surface
//! as `DomainError::Conflict`, which the engine retries a bounded number
//! of times.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::mysql::MySqlDatabaseError;
use sqlx::{MySql, MySqlPool, Row, Transaction};
use uuid::Uuid;

use gs_shared::types::DateRange;

use gs_core::domain::entities::booking::{Booking, BookingStatus};
use gs_core::errors::{BookingError, DomainError};
use gs_core::repositories::BookingRepository;
use gs_core::services::booking::availability::peak_reserved;

const BOOKING_COLUMNS: &str = r#"
    id, item_id, renter_id, start_date, end_date, quantity,
    status, total_price, created_at, expires_at
"#;

// MySQL error numbers for deadlock and lock wait timeout
const ER_LOCK_DEADLOCK: u16 = 1213;
const ER_LOCK_WAIT_TIMEOUT: u16 = 1205;

/// MySQL implementation of BookingRepository
pub struct MySqlBookingRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlBookingRepository {
    /// Create a new MySQL booking repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to Booking entity
    fn row_to_booking(row: &sqlx::mysql::MySqlRow) -> Result<Booking, DomainError> {
        let id: String = row.try_get("id").map_err(|e| DomainError::Database {
            message: format!("Failed to get id: {}", e),
        })?;
        let item_id: String = row
            .try_get("item_id")
            .map_err(|e| DomainError::Database {
                message: format!("Failed to get item_id: {}", e),
            })?;
        let renter_id: String = row
            .try_get("renter_id")
            .map_err(|e| DomainError::Database {
                message: format!("Failed to get renter_id: {}", e),
            })?;

        let start_date: NaiveDate = row
            .try_get("start_date")
            .map_err(|e| DomainError::Database {
                message: format!("Failed to get start_date: {}", e),
            })?;
        let end_date: NaiveDate = row
            .try_get("end_date")
            .map_err(|e| DomainError::Database {
                message: format!("Failed to get end_date: {}", e),
            })?;
        let range = DateRange::new(start_date, end_date).map_err(|e| DomainError::Database {
            message: format!("Invalid stored date range: {}", e),
        })?;

        let status_str: String = row
            .try_get("status")
            .map_err(|e| DomainError::Database {
                message: format!("Failed to get status: {}", e),
            })?;
        let status = BookingStatus::from_str(&status_str)
            .map_err(|e| DomainError::Database { message: e })?;

        Ok(Booking {
            id: parse_uuid(&id)?,
            item_id: parse_uuid(&item_id)?,
            renter_id: parse_uuid(&renter_id)?,
            range,
            quantity: row
                .try_get::<u32, _>("quantity")
                .map_err(|e| DomainError::Database {
                    message: format!("Failed to get quantity: {}", e),
                })?,
            status,
            total_price: row
                .try_get::<Decimal, _>("total_price")
                .map_err(|e| DomainError::Database {
                    message: format!("Failed to get total_price: {}", e),
                })?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::Database {
                    message: format!("Failed to get created_at: {}", e),
                })?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| DomainError::Database {
                    message: format!("Failed to get expires_at: {}", e),
                })?,
        })
    }

    /// Lock the item row and return its on-hand quantity
    ///
    /// The `FOR UPDATE` lock is what serializes every availability-checked
    /// write for the same item; reading `total_quantity` from the locked
    /// row means a concurrent inventory reduction is never overrun.
    async fn lock_item_quantity(
        tx: &mut Transaction<'_, MySql>,
        item_id: Uuid,
    ) -> Result<u32, DomainError> {
        let locked = sqlx::query("SELECT total_quantity FROM items WHERE id = ? FOR UPDATE")
            .bind(item_id.to_string())
            .fetch_optional(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;
        let Some(row) = locked else {
            return Err(DomainError::item_not_found(item_id));
        };
        row.try_get::<u32, _>("total_quantity")
            .map_err(|e| DomainError::Database {
                message: format!("Failed to get total_quantity: {}", e),
            })
    }

    /// Load active bookings overlapping a range, inside the transaction
    async fn overlapping_in_tx(
        tx: &mut Transaction<'_, MySql>,
        item_id: Uuid,
        range: &DateRange,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, DomainError> {
        let query = format!(
            r#"
            SELECT {}
            FROM bookings
            WHERE item_id = ?
              AND start_date < ?
              AND end_date > ?
              AND (status = 'confirmed' OR (status = 'pending' AND expires_at >= ?))
            "#,
            BOOKING_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(item_id.to_string())
            .bind(range.end())
            .bind(range.start())
            .bind(now)
            .fetch_all(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;
        rows.iter().map(Self::row_to_booking).collect()
    }

    /// Insert a booking row inside the given transaction
    async fn insert_booking(
        tx: &mut Transaction<'_, MySql>,
        booking: &Booking,
    ) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO bookings (
                id, item_id, renter_id, start_date, end_date, quantity,
                status, total_price, created_at, expires_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(booking.id.to_string())
            .bind(booking.item_id.to_string())
            .bind(booking.renter_id.to_string())
            .bind(booking.range.start())
            .bind(booking.range.end())
            .bind(booking.quantity)
            .bind(booking.status.as_str())
            .bind(booking.total_price)
            .bind(booking.created_at)
            .bind(booking.expires_at)
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn fetch_bookings(&self, query: &str, bind: &str) -> Result<Vec<Booking>, DomainError> {
        let rows = sqlx::query(query)
            .bind(bind)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(Self::row_to_booking).collect()
    }
}

#[async_trait]
impl BookingRepository for MySqlBookingRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, DomainError> {
        let query = format!(
            "SELECT {} FROM bookings WHERE id = ? LIMIT 1",
            BOOKING_COLUMNS
        );

        let result = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        match result {
            Some(row) => Ok(Some(Self::row_to_booking(&row)?)),
            None => Ok(None),
        }
    }

    async fn insert_if_available(
        &self,
        booking: Booking,
        _total_quantity: u32,
    ) -> Result<Booking, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // Lock the item row so concurrent writes for the same item
        // serialize; the locked row is the authoritative on-hand quantity
        let on_hand = Self::lock_item_quantity(&mut tx, booking.item_id).await?;

        let now = Utc::now();
        let overlapping =
            Self::overlapping_in_tx(&mut tx, booking.item_id, &booking.range, now).await?;

        let peak = peak_reserved(&overlapping, &booking.range, None, now);
        let available = on_hand.saturating_sub(peak.total);
        if booking.quantity > available {
            // Dropping the transaction rolls it back
            return Err(BookingError::InsufficientInventory {
                requested: booking.quantity,
                available,
            }
            .into());
        }

        Self::insert_booking(&mut tx, &booking).await?;
        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(booking)
    }

    async fn update_if_available(
        &self,
        booking: Booking,
        _total_quantity: u32,
    ) -> Result<Booking, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let on_hand = Self::lock_item_quantity(&mut tx, booking.item_id).await?;

        let now = Utc::now();
        let overlapping =
            Self::overlapping_in_tx(&mut tx, booking.item_id, &booking.range, now).await?;

        let peak = peak_reserved(&overlapping, &booking.range, Some(booking.id), now);
        let available = on_hand.saturating_sub(peak.total);
        if booking.quantity > available {
            return Err(BookingError::InsufficientInventory {
                requested: booking.quantity,
                available,
            }
            .into());
        }

        let query = r#"
            UPDATE bookings SET
                start_date = ?,
                end_date = ?,
                quantity = ?,
                status = ?,
                total_price = ?,
                expires_at = ?
            WHERE id = ?
        "#;
        let result = sqlx::query(query)
            .bind(booking.range.start())
            .bind(booking.range.end())
            .bind(booking.quantity)
            .bind(booking.status.as_str())
            .bind(booking.total_price)
            .bind(booking.expires_at)
            .bind(booking.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::booking_not_found(booking.id));
        }
        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(booking)
    }

    async fn confirm_pending(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Booking, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // Non-locking read just to learn the item; locks are then taken in
        // the same order as insert_if_available (items before bookings)
        let row = sqlx::query("SELECT item_id FROM bookings WHERE id = ? LIMIT 1")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        let Some(row) = row else {
            return Err(DomainError::booking_not_found(id));
        };
        let item_id: String = row.try_get("item_id").map_err(|e| DomainError::Database {
            message: format!("Failed to get item_id: {}", e),
        })?;

        sqlx::query("SELECT id FROM items WHERE id = ? FOR UPDATE")
            .bind(&item_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let query = format!(
            "SELECT {} FROM bookings WHERE id = ? LIMIT 1 FOR UPDATE",
            BOOKING_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        let Some(row) = row else {
            return Err(DomainError::booking_not_found(id));
        };
        let mut booking = Self::row_to_booking(&row)?;

        if booking.status != BookingStatus::Pending {
            return Err(BookingError::InvalidState {
                current: booking.status,
                action: "confirm",
            }
            .into());
        }

        let next = if booking.expires_at >= now {
            BookingStatus::Confirmed
        } else {
            BookingStatus::Cancelled
        };
        sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
            .bind(next.as_str())
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        tx.commit().await.map_err(map_sqlx_error)?;

        if next == BookingStatus::Confirmed {
            booking.status = BookingStatus::Confirmed;
            Ok(booking)
        } else {
            Err(BookingError::Expired.into())
        }
    }

    async fn cancel_if_lapsed(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE bookings SET status = 'cancelled'
            WHERE id = ? AND status = 'pending' AND expires_at < ?
        "#;
        let result = sqlx::query(query)
            .bind(id.to_string())
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn update(&self, booking: Booking) -> Result<Booking, DomainError> {
        let query = r#"
            UPDATE bookings SET
                status = ?,
                total_price = ?,
                expires_at = ?
            WHERE id = ?
        "#;

        let result = sqlx::query(query)
            .bind(booking.status.as_str())
            .bind(booking.total_price)
            .bind(booking.expires_at)
            .bind(booking.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::booking_not_found(booking.id));
        }

        Ok(booking)
    }

    async fn find_overlapping(
        &self,
        item_id: Uuid,
        range: DateRange,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, DomainError> {
        let query = format!(
            r#"
            SELECT {}
            FROM bookings
            WHERE item_id = ?
              AND start_date < ?
              AND end_date > ?
              AND (status = 'confirmed' OR (status = 'pending' AND expires_at >= ?))
            "#,
            BOOKING_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(item_id.to_string())
            .bind(range.end())
            .bind(range.start())
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(Self::row_to_booking).collect()
    }

    async fn list_all(&self) -> Result<Vec<Booking>, DomainError> {
        let query = format!(
            "SELECT {} FROM bookings ORDER BY created_at DESC",
            BOOKING_COLUMNS
        );

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(Self::row_to_booking).collect()
    }

    async fn list_by_renter(&self, renter_id: Uuid) -> Result<Vec<Booking>, DomainError> {
        let query = format!(
            "SELECT {} FROM bookings WHERE renter_id = ? ORDER BY created_at DESC",
            BOOKING_COLUMNS
        );
        self.fetch_bookings(&query, &renter_id.to_string()).await
    }

    async fn list_by_item(&self, item_id: Uuid) -> Result<Vec<Booking>, DomainError> {
        let query = format!(
            "SELECT {} FROM bookings WHERE item_id = ? ORDER BY created_at DESC",
            BOOKING_COLUMNS
        );
        self.fetch_bookings(&query, &item_id.to_string()).await
    }

    async fn list_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>, DomainError> {
        let query = format!(
            "SELECT {} FROM bookings WHERE status = ? ORDER BY created_at DESC",
            BOOKING_COLUMNS
        );
        self.fetch_bookings(&query, status.as_str()).await
    }

    async fn find_expired_pending(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Booking>, DomainError> {
        let query = format!(
            r#"
            SELECT {}
            FROM bookings
            WHERE status = 'pending' AND expires_at < ?
            ORDER BY expires_at ASC
            LIMIT ?
            "#,
            BOOKING_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(now)
            .bind(limit as u32)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(Self::row_to_booking).collect()
    }
}

fn parse_uuid(value: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(value).map_err(|e| DomainError::Database {
        message: format!("Invalid UUID: {}", e),
    })
}

/// Map SQLx errors, surfacing serialization failures as retryable conflicts
fn map_sqlx_error(e: sqlx::Error) -> DomainError {
    if let Some(db_err) = e.as_database_error() {
        if let Some(mysql_err) = db_err.try_downcast_ref::<MySqlDatabaseError>() {
            if mysql_err.number() == ER_LOCK_DEADLOCK
                || mysql_err.number() == ER_LOCK_WAIT_TIMEOUT
            {
                return DomainError::Conflict {
                    message: mysql_err.to_string(),
                };
            }
        }
    }
    DomainError::Database {
        message: format!("Database query failed: {}", e),
    }
}
