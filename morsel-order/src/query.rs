use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use morsel_core::CoreResult;

use crate::models::{Order, OrderStatus};
use crate::repository::OrderRepository;

/// Platform-wide order statistics.
#[derive(Debug, Clone, Serialize)]
pub struct OrderStats {
    pub total_orders: usize,
    pub placed_orders: usize,
    pub completed_orders: usize,
    pub active_orders: usize,
    /// Revenue counts completed orders only.
    pub total_revenue: f64,
}

/// Per-driver delivery statistics.
#[derive(Debug, Clone, Serialize)]
pub struct DriverStats {
    pub total_orders: usize,
    pub completed_orders: usize,
    pub active_orders: usize,
}

/// Read-side projections over the order collection. Pure filters, no
/// side effects; "active" excludes every terminal status.
pub struct OrderQueryService {
    orders: Arc<dyn OrderRepository>,
}

impl OrderQueryService {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    /// Orders a driver can still claim: early statuses with no driver.
    pub async fn unclaimed(&self) -> CoreResult<Vec<Order>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|o| {
                o.driver_id.is_none()
                    && matches!(
                        o.status,
                        OrderStatus::Placed | OrderStatus::Accepted | OrderStatus::Ready
                    )
            })
            .collect())
    }

    pub async fn by_status(&self, status: OrderStatus) -> CoreResult<Vec<Order>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|o| o.status == status)
            .collect())
    }

    pub async fn by_restaurant(&self, restaurant_id: Uuid) -> CoreResult<Vec<Order>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|o| o.restaurant_id == restaurant_id)
            .collect())
    }

    pub async fn by_driver(&self, driver_id: Uuid) -> CoreResult<Vec<Order>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|o| o.driver_id == Some(driver_id))
            .collect())
    }

    pub async fn by_customer(&self, customer_id: Uuid) -> CoreResult<Vec<Order>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|o| o.customer_id == customer_id)
            .collect())
    }

    pub async fn active_for_customer(&self, customer_id: Uuid) -> CoreResult<Vec<Order>> {
        Ok(self
            .by_customer(customer_id)
            .await?
            .into_iter()
            .filter(|o| !o.status.is_terminal())
            .collect())
    }

    pub async fn active_for_driver(&self, driver_id: Uuid) -> CoreResult<Vec<Order>> {
        Ok(self
            .by_driver(driver_id)
            .await?
            .into_iter()
            .filter(|o| !o.status.is_terminal())
            .collect())
    }

    /// Orders a restaurant still has to act on.
    pub async fn pending_for_restaurant(&self, restaurant_id: Uuid) -> CoreResult<Vec<Order>> {
        Ok(self
            .by_restaurant(restaurant_id)
            .await?
            .into_iter()
            .filter(|o| matches!(o.status, OrderStatus::Placed | OrderStatus::Accepted))
            .collect())
    }

    pub async fn stats(&self) -> CoreResult<OrderStats> {
        let orders = self.all().await?;
        let placed = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Placed)
            .count();
        let completed = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Completed)
            .count();
        let active = orders.iter().filter(|o| !o.status.is_terminal()).count();
        let revenue = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Completed)
            .map(|o| o.price)
            .sum();
        Ok(OrderStats {
            total_orders: orders.len(),
            placed_orders: placed,
            completed_orders: completed,
            active_orders: active,
            total_revenue: revenue,
        })
    }

    pub async fn driver_stats(&self, driver_id: Uuid) -> CoreResult<DriverStats> {
        let orders = self.by_driver(driver_id).await?;
        let completed = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Completed)
            .count();
        let active = orders.iter().filter(|o| !o.status.is_terminal()).count();
        Ok(DriverStats {
            total_orders: orders.len(),
            completed_orders: completed,
            active_orders: active,
        })
    }

    async fn all(&self) -> CoreResult<Vec<Order>> {
        self.orders.list().await
    }
}
