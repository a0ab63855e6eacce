//! Item repository trait defining the interface for item data persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::item::Item;
use crate::errors::DomainError;

/// Repository trait for Item entity persistence operations
///
/// Implementations handle the actual database operations while maintaining
/// the abstraction boundary between domain and infrastructure layers.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Find an item by its unique identifier
    ///
    /// # Returns
    /// * `Ok(Some(Item))` - Item found
    /// * `Ok(None)` - No item with the given ID
    /// * `Err(DomainError)` - Database or other error occurred
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Item>, DomainError>;

    /// Create a new item listing
    async fn create(&self, item: Item) -> Result<Item, DomainError>;

    /// Update an existing item
    async fn update(&self, item: Item) -> Result<Item, DomainError>;

    /// Delete an item
    ///
    /// # Returns
    /// * `Ok(true)` - Item was deleted
    /// * `Ok(false)` - Item not found
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;

    /// List all items owned by a user
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Item>, DomainError>;
}
