//! Mock implementation of ItemRepository for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::item::Item;
use crate::errors::DomainError;

use super::ItemRepository;

/// Mock implementation of ItemRepository for testing
pub struct MockItemRepository {
    items: Arc<RwLock<HashMap<Uuid, Item>>>,
    should_fail: Arc<RwLock<bool>>,
}

impl MockItemRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(HashMap::new())),
            should_fail: Arc::new(RwLock::new(false)),
        }
    }

    /// Set whether operations should fail
    pub async fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.write().await = should_fail;
    }

    async fn check_failure(&self) -> Result<(), DomainError> {
        if *self.should_fail.read().await {
            return Err(DomainError::Database {
                message: "Mock repository error".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MockItemRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemRepository for MockItemRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Item>, DomainError> {
        self.check_failure().await?;
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn create(&self, item: Item) -> Result<Item, DomainError> {
        self.check_failure().await?;
        self.items.write().await.insert(item.id, item.clone());
        Ok(item)
    }

    async fn update(&self, item: Item) -> Result<Item, DomainError> {
        self.check_failure().await?;
        let mut items = self.items.write().await;
        if !items.contains_key(&item.id) {
            return Err(DomainError::item_not_found(item.id));
        }
        items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        self.check_failure().await?;
        Ok(self.items.write().await.remove(&id).is_some())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Item>, DomainError> {
        self.check_failure().await?;
        let items = self.items.read().await;
        let mut result: Vec<Item> = items
            .values()
            .filter(|item| item.owner_id == owner_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }
}
