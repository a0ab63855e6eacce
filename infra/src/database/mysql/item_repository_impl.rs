//! MySQL implementation of the ItemRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use gs_core::domain::entities::item::Item;
use gs_core::errors::DomainError;
use gs_core::repositories::ItemRepository;

/// MySQL implementation of ItemRepository
pub struct MySqlItemRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlItemRepository {
    /// Create a new MySQL item repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to Item entity
    fn row_to_item(row: &sqlx::mysql::MySqlRow) -> Result<Item, DomainError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| DomainError::Database {
                message: format!("Failed to get id: {}", e),
            })?;
        let owner_id: String = row
            .try_get("owner_id")
            .map_err(|e| DomainError::Database {
                message: format!("Failed to get owner_id: {}", e),
            })?;

        Ok(Item {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Database {
                message: format!("Invalid UUID: {}", e),
            })?,
            owner_id: Uuid::parse_str(&owner_id).map_err(|e| DomainError::Database {
                message: format!("Invalid UUID: {}", e),
            })?,
            title: row.try_get("title").map_err(|e| DomainError::Database {
                message: format!("Failed to get title: {}", e),
            })?,
            description: row
                .try_get("description")
                .map_err(|e| DomainError::Database {
                    message: format!("Failed to get description: {}", e),
                })?,
            category: row
                .try_get("category")
                .map_err(|e| DomainError::Database {
                    message: format!("Failed to get category: {}", e),
                })?,
            price_per_day: row
                .try_get::<Decimal, _>("price_per_day")
                .map_err(|e| DomainError::Database {
                    message: format!("Failed to get price_per_day: {}", e),
                })?,
            total_quantity: row
                .try_get::<u32, _>("total_quantity")
                .map_err(|e| DomainError::Database {
                    message: format!("Failed to get total_quantity: {}", e),
                })?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::Database {
                    message: format!("Failed to get created_at: {}", e),
                })?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(|e| DomainError::Database {
                    message: format!("Failed to get updated_at: {}", e),
                })?,
        })
    }
}

#[async_trait]
impl ItemRepository for MySqlItemRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Item>, DomainError> {
        let query = r#"
            SELECT id, owner_id, title, description, category,
                   price_per_day, total_quantity, created_at, updated_at
            FROM items
            WHERE id = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Database {
                message: format!("Database query failed: {}", e),
            })?;

        match result {
            Some(row) => Ok(Some(Self::row_to_item(&row)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, item: Item) -> Result<Item, DomainError> {
        let query = r#"
            INSERT INTO items (
                id, owner_id, title, description, category,
                price_per_day, total_quantity, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(item.id.to_string())
            .bind(item.owner_id.to_string())
            .bind(&item.title)
            .bind(&item.description)
            .bind(&item.category)
            .bind(item.price_per_day)
            .bind(item.total_quantity)
            .bind(item.created_at)
            .bind(item.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Database {
                message: format!("Failed to create item: {}", e),
            })?;

        Ok(item)
    }

    async fn update(&self, item: Item) -> Result<Item, DomainError> {
        let query = r#"
            UPDATE items SET
                title = ?,
                description = ?,
                category = ?,
                price_per_day = ?,
                total_quantity = ?,
                updated_at = ?
            WHERE id = ?
        "#;

        let result = sqlx::query(query)
            .bind(&item.title)
            .bind(&item.description)
            .bind(&item.category)
            .bind(item.price_per_day)
            .bind(item.total_quantity)
            .bind(Utc::now())
            .bind(item.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Database {
                message: format!("Failed to update item: {}", e),
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::item_not_found(item.id));
        }

        let mut updated_item = item;
        updated_item.updated_at = Utc::now();
        Ok(updated_item)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let query = "DELETE FROM items WHERE id = ?";

        let result = sqlx::query(query)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Database {
                message: format!("Failed to delete item: {}", e),
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Item>, DomainError> {
        let query = r#"
            SELECT id, owner_id, title, description, category,
                   price_per_day, total_quantity, created_at, updated_at
            FROM items
            WHERE owner_id = ?
            ORDER BY created_at DESC
        "#;

        let rows = sqlx::query(query)
            .bind(owner_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Database {
                message: format!("Database query failed: {}", e),
            })?;

        rows.iter().map(Self::row_to_item).collect()
    }
}
