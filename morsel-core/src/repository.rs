use async_trait::async_trait;
use uuid::Uuid;

use crate::actor::Actor;
use crate::CoreResult;

/// Repository trait for user/actor data access
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn save_user(&self, actor: &Actor) -> CoreResult<()>;

    async fn get_user(&self, id: Uuid) -> CoreResult<Option<Actor>>;

    async fn list_users(&self) -> CoreResult<Vec<Actor>>;

    /// Add earned loyalty points to a customer-capable actor's balance.
    async fn credit_loyalty_points(&self, id: Uuid, points: i64) -> CoreResult<()>;
}
