use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use morsel_catalog::{MenuItem, MenuRepository};
use morsel_core::{Actor, CoreError, CoreResult, UserRepository};
use morsel_order::{Order, OrderRepository};

/// In-memory data store backing all repository traits.
///
/// Orders carry a version token; `update` is a compare-and-swap on it,
/// performed under one write lock so concurrent writers serialize and
/// the loser observes a version mismatch.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, Actor>>,
    menu: RwLock<HashMap<Uuid, MenuItem>>,
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn save_user(&self, actor: &Actor) -> CoreResult<()> {
        self.users.write().await.insert(actor.id, actor.clone());
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> CoreResult<Option<Actor>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn list_users(&self) -> CoreResult<Vec<Actor>> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn credit_loyalty_points(&self, id: Uuid, points: i64) -> CoreResult<()> {
        let mut users = self.users.write().await;
        let actor = users
            .get_mut(&id)
            .ok_or_else(|| CoreError::NotFound(format!("user {id}")))?;
        actor.credit_loyalty(points)
    }
}

#[async_trait]
impl MenuRepository for MemoryStore {
    async fn save_item(&self, item: &MenuItem) -> CoreResult<()> {
        self.menu.write().await.insert(item.id, item.clone());
        Ok(())
    }

    async fn get_item(&self, id: Uuid) -> CoreResult<Option<MenuItem>> {
        Ok(self.menu.read().await.get(&id).cloned())
    }

    async fn list_by_restaurant(&self, restaurant_id: Uuid) -> CoreResult<Vec<MenuItem>> {
        Ok(self
            .menu
            .read()
            .await
            .values()
            .filter(|m| m.restaurant_id == restaurant_id)
            .cloned()
            .collect())
    }

    async fn delete_item(&self, id: Uuid) -> CoreResult<()> {
        self.menu
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CoreError::NotFound(format!("menu item {id}")))
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn insert(&self, order: &Order) -> CoreResult<()> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(CoreError::Conflict(format!(
                "order {} already exists",
                order.id
            )));
        }
        orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> CoreResult<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn update(&self, order: &Order) -> CoreResult<Order> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .get_mut(&order.id)
            .ok_or_else(|| CoreError::NotFound(format!("order {}", order.id)))?;
        if stored.version != order.version {
            return Err(CoreError::Conflict(format!(
                "order {} was modified concurrently",
                order.id
            )));
        }
        let mut next = order.clone();
        next.version += 1;
        *stored = next.clone();
        Ok(next)
    }

    async fn remove(&self, id: Uuid) -> CoreResult<()> {
        self.orders
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CoreError::NotFound(format!("order {id}")))
    }

    async fn list(&self) -> CoreResult<Vec<Order>> {
        Ok(self.orders.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morsel_order::OrderLine;

    fn order() -> Order {
        Order::new(
            "test".to_string(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            vec![OrderLine {
                menu_item_id: Uuid::new_v4(),
                name: "dish".to_string(),
                unit_price: 12.0,
                quantity: 1,
            }],
            12.0,
        )
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id() {
        let store = MemoryStore::new();
        let o = order();
        store.insert(&o).await.unwrap();
        assert!(matches!(
            store.insert(&o).await,
            Err(CoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_update_bumps_version() {
        let store = MemoryStore::new();
        let o = order();
        store.insert(&o).await.unwrap();

        let stored = store.update(&o).await.unwrap();
        assert_eq!(stored.version, o.version + 1);
    }

    #[tokio::test]
    async fn test_stale_version_conflicts() {
        let store = MemoryStore::new();
        let o = order();
        store.insert(&o).await.unwrap();

        store.update(&o).await.unwrap();
        // Same snapshot again: version no longer matches.
        assert!(matches!(store.update(&o).await, Err(CoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_concurrent_claims_settle_to_one_winner() {
        use morsel_order::OrderStatus;
        use std::sync::Arc;

        let store = Arc::new(MemoryStore::new());
        let o = order();
        store.insert(&o).await.unwrap();

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let snapshot = o.clone();
            tasks.push(tokio::spawn(async move {
                let mut claim = snapshot;
                claim.driver_id = Some(Uuid::new_v4());
                claim.status = OrderStatus::DriverAssigned;
                store.update(&claim).await
            }));
        }

        let mut winners = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_remove_missing_order_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.remove(Uuid::new_v4()).await,
            Err(CoreError::NotFound(_))
        ));
    }
}
