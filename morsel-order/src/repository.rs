use async_trait::async_trait;
use uuid::Uuid;

use morsel_core::CoreResult;

use crate::models::Order;

/// Repository trait for order data access.
///
/// `update` is a conditional write: the store applies it only when the
/// stored `version` matches the caller's snapshot, and answers
/// `CoreError::Conflict` otherwise. That makes every state-machine
/// mutation a single atomic read-modify-write, so a losing concurrent
/// claim fails instead of silently overwriting.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert(&self, order: &Order) -> CoreResult<()>;

    async fn get(&self, id: Uuid) -> CoreResult<Option<Order>>;

    /// Compare-and-swap on `order.version`; returns the stored order
    /// with its version bumped.
    async fn update(&self, order: &Order) -> CoreResult<Order>;

    /// Hard delete. Only the administrative purge path may use this.
    async fn remove(&self, id: Uuid) -> CoreResult<()>;

    async fn list(&self) -> CoreResult<Vec<Order>>;
}
