use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use uuid::Uuid;

use morsel_catalog::{MenuRepository, PricingEngine};
use morsel_core::{Actor, CoreError, CoreResult, Role, UserRepository};

use crate::loyalty::LoyaltyCalculator;
use crate::models::{Order, OrderLine, OrderStatus};
use crate::repository::OrderRepository;

/// One requested menu item with its quantity.
#[derive(Debug, Clone, Deserialize)]
pub struct LineRequest {
    pub menu_item_id: Uuid,
    pub quantity: u32,
}

/// Owns the order lifecycle: legal status transitions, role and
/// ownership checks, dynamic pricing, and the loyalty side effect on
/// completion. Every mutation is a read-validate-conditional-write
/// against the order repository.
pub struct OrderStateMachine {
    orders: Arc<dyn OrderRepository>,
    users: Arc<dyn UserRepository>,
    menu: Arc<dyn MenuRepository>,
    pricing: PricingEngine,
    loyalty: LoyaltyCalculator,
}

impl OrderStateMachine {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        users: Arc<dyn UserRepository>,
        menu: Arc<dyn MenuRepository>,
        pricing: PricingEngine,
        loyalty: LoyaltyCalculator,
    ) -> Self {
        Self {
            orders,
            users,
            menu,
            pricing,
            loyalty,
        }
    }

    /// Create a new order in PLACED status, priced at the current time.
    pub async fn create_order(
        &self,
        customer_id: Uuid,
        restaurant_id: Uuid,
        lines: Vec<LineRequest>,
    ) -> CoreResult<Order> {
        self.create_order_at(customer_id, restaurant_id, lines, Local::now().naive_local())
            .await
    }

    /// Create an order priced against an explicit local reference time.
    pub async fn create_order_at(
        &self,
        customer_id: Uuid,
        restaurant_id: Uuid,
        lines: Vec<LineRequest>,
        reference: NaiveDateTime,
    ) -> CoreResult<Order> {
        let customer = self.fetch_actor(customer_id).await?;
        if customer.loyalty_points().is_none() {
            return Err(CoreError::Validation(
                "only customer accounts can place orders".into(),
            ));
        }
        let restaurant = self.fetch_actor(restaurant_id).await?;
        if restaurant.role() != Role::Restaurant {
            return Err(CoreError::Validation(
                "orders must target a restaurant account".into(),
            ));
        }
        if lines.is_empty() {
            return Err(CoreError::Validation(
                "order must contain at least one item".into(),
            ));
        }

        let mut order_lines = Vec::with_capacity(lines.len());
        for line in &lines {
            if line.quantity == 0 {
                return Err(CoreError::Validation(
                    "item quantity must be at least one".into(),
                ));
            }
            let item = self
                .menu
                .get_item(line.menu_item_id)
                .await?
                .ok_or_else(|| CoreError::NotFound(format!("menu item {}", line.menu_item_id)))?;
            if item.restaurant_id != restaurant_id {
                return Err(CoreError::Validation(format!(
                    "menu item {} belongs to another restaurant",
                    item.id
                )));
            }
            order_lines.push(OrderLine {
                menu_item_id: item.id,
                name: item.name,
                unit_price: item.price,
                quantity: line.quantity,
            });
        }

        let base_sum: f64 = order_lines.iter().map(OrderLine::subtotal).sum();
        let final_price = self.pricing.price_at(base_sum, reference);

        let order = Order::new(
            format!("Order for {}", customer.profile.name),
            customer_id,
            restaurant_id,
            order_lines,
            final_price,
        );
        self.orders.insert(&order).await?;
        tracing::info!(order_id = %order.id, price = order.price, "order placed");
        Ok(order)
    }

    pub async fn get_order(&self, order_id: Uuid) -> CoreResult<Order> {
        self.orders
            .get(order_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("order {order_id}")))
    }

    /// Apply a status transition on behalf of an acting actor, checking
    /// both the lifecycle graph and the actor's role and ownership.
    pub async fn set_status(
        &self,
        order_id: Uuid,
        requested: OrderStatus,
        acting_actor_id: Uuid,
    ) -> CoreResult<Order> {
        let order = self.get_order(order_id).await?;
        if order.status == OrderStatus::Completed {
            return Err(CoreError::OrderLocked(format!("order {order_id}")));
        }
        if requested == OrderStatus::DriverAssigned {
            return Err(CoreError::Validation(
                "drivers are assigned through the claim operation".into(),
            ));
        }
        if !OrderStatus::can_transition(order.status, requested) {
            return Err(CoreError::Validation(format!(
                "illegal transition {} -> {}",
                order.status, requested
            )));
        }

        let actor = self.fetch_actor(acting_actor_id).await?;
        self.check_mutation_rights(&order, requested, &actor)?;

        let mut updated = order;
        updated.status = requested;
        updated.touch();
        let stored = self.orders.update(&updated).await?;
        tracing::info!(order_id = %order_id, status = %requested, "order status changed");

        if requested == OrderStatus::Completed {
            self.credit_completion_points(&stored).await;
        }
        Ok(stored)
    }

    /// A driver claims an unassigned order. Allowed while no driver is
    /// set and the order is not finished; the conditional write settles
    /// concurrent claims, the loser gets a conflict.
    pub async fn assign_driver(&self, order_id: Uuid, driver_id: Uuid) -> CoreResult<Order> {
        let order = self.get_order(order_id).await?;
        if order.status == OrderStatus::Completed {
            return Err(CoreError::OrderLocked(format!("order {order_id}")));
        }
        if order.status == OrderStatus::Delivered || order.status.is_terminal() {
            return Err(CoreError::Validation(
                "order is already finished".into(),
            ));
        }
        if order.driver_id.is_some() {
            return Err(CoreError::Conflict("order already has a driver".into()));
        }

        let driver = self.fetch_actor(driver_id).await?;
        if driver.role() != Role::Driver {
            return Err(CoreError::Validation("actor is not a driver".into()));
        }

        let mut updated = order;
        updated.driver_id = Some(driver_id);
        updated.status = OrderStatus::DriverAssigned;
        updated.touch();
        let stored = self.orders.update(&updated).await?;
        tracing::info!(order_id = %order_id, driver_id = %driver_id, "order claimed");
        Ok(stored)
    }

    /// Customer cancellation: PLACED orders only. The record is kept
    /// with status CANCELLED; nothing is deleted.
    pub async fn cancel_order(&self, order_id: Uuid) -> CoreResult<Order> {
        let order = self.get_order(order_id).await?;
        if order.status != OrderStatus::Placed {
            return Err(CoreError::Validation(
                "only orders awaiting acceptance can be cancelled".into(),
            ));
        }
        let mut updated = order;
        updated.status = OrderStatus::Cancelled;
        updated.touch();
        let stored = self.orders.update(&updated).await?;
        tracing::info!(order_id = %order_id, "order cancelled");
        Ok(stored)
    }

    /// Administrative hard delete of a not-yet-accepted order.
    pub async fn purge_order(&self, order_id: Uuid) -> CoreResult<()> {
        let order = self.get_order(order_id).await?;
        if order.status != OrderStatus::Placed {
            return Err(CoreError::Validation(
                "only orders awaiting acceptance can be purged".into(),
            ));
        }
        self.orders.remove(order_id).await?;
        tracing::info!(order_id = %order_id, "order purged");
        Ok(())
    }

    /// Drop a line from a PLACED order and reprice it. The peak-hour
    /// reference is the order's creation time, so an edit never moves an
    /// order in or out of peak pricing.
    pub async fn remove_line(&self, order_id: Uuid, menu_item_id: Uuid) -> CoreResult<Order> {
        let order = self.get_order(order_id).await?;
        if order.status == OrderStatus::Completed {
            return Err(CoreError::OrderLocked(format!("order {order_id}")));
        }
        if order.status != OrderStatus::Placed {
            return Err(CoreError::Validation(
                "items can only be removed before the restaurant accepts".into(),
            ));
        }
        if !order.lines.iter().any(|l| l.menu_item_id == menu_item_id) {
            return Err(CoreError::NotFound(format!(
                "menu item {menu_item_id} on order {order_id}"
            )));
        }
        if order.lines.len() == 1 {
            return Err(CoreError::Validation(
                "order must keep at least one item".into(),
            ));
        }

        let mut updated = order;
        updated.lines.retain(|l| l.menu_item_id != menu_item_id);
        let reference = updated
            .created_at
            .with_timezone(&Local)
            .naive_local();
        updated.price = self.pricing.price_at(updated.base_price(), reference);
        updated.touch();
        let stored = self.orders.update(&updated).await?;
        tracing::info!(order_id = %order_id, price = stored.price, "order line removed");
        Ok(stored)
    }

    /// The chat collaborator may not accept new messages for dead
    /// orders: completed, cancelled, or rejected.
    pub async fn is_chat_locked(&self, order_id: Uuid) -> CoreResult<bool> {
        let order = self.get_order(order_id).await?;
        Ok(order.status.is_terminal())
    }

    fn check_mutation_rights(
        &self,
        order: &Order,
        requested: OrderStatus,
        actor: &Actor,
    ) -> CoreResult<()> {
        let required = requested.authorized_role().ok_or_else(|| {
            CoreError::Validation(format!("status {requested} cannot be requested directly"))
        })?;
        if actor.role() != required {
            return Err(CoreError::Unauthorized(format!(
                "transition to {requested} requires the {required:?} role"
            )));
        }
        let owns = match required {
            Role::Restaurant => order.restaurant_id == actor.id,
            Role::Driver => order.driver_id == Some(actor.id),
            Role::Customer => order.customer_id == actor.id,
        };
        if !owns {
            return Err(CoreError::Unauthorized(
                "this order is not assigned to you".into(),
            ));
        }
        Ok(())
    }

    async fn fetch_actor(&self, id: Uuid) -> CoreResult<Actor> {
        self.users
            .get_user(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("user {id}")))
    }

    /// Best effort: the status write has already landed, a failed credit
    /// is logged and never rolls it back.
    async fn credit_completion_points(&self, order: &Order) {
        let points = self.loyalty.points_for(order.price);
        if points == 0 {
            return;
        }
        if let Err(err) = self
            .users
            .credit_loyalty_points(order.customer_id, points)
            .await
        {
            tracing::warn!(
                order_id = %order.id,
                customer_id = %order.customer_id,
                %err,
                "failed to credit loyalty points"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use morsel_catalog::{MenuItem, PricingConfig};
    use morsel_core::{Profile, VehicleType};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct TestBackend {
        users: Mutex<HashMap<Uuid, Actor>>,
        menu: Mutex<HashMap<Uuid, MenuItem>>,
        orders: Mutex<HashMap<Uuid, Order>>,
    }

    #[async_trait]
    impl UserRepository for TestBackend {
        async fn save_user(&self, actor: &Actor) -> CoreResult<()> {
            self.users.lock().unwrap().insert(actor.id, actor.clone());
            Ok(())
        }

        async fn get_user(&self, id: Uuid) -> CoreResult<Option<Actor>> {
            Ok(self.users.lock().unwrap().get(&id).cloned())
        }

        async fn list_users(&self) -> CoreResult<Vec<Actor>> {
            Ok(self.users.lock().unwrap().values().cloned().collect())
        }

        async fn credit_loyalty_points(&self, id: Uuid, points: i64) -> CoreResult<()> {
            let mut users = self.users.lock().unwrap();
            let actor = users
                .get_mut(&id)
                .ok_or_else(|| CoreError::NotFound(format!("user {id}")))?;
            actor.credit_loyalty(points)
        }
    }

    #[async_trait]
    impl MenuRepository for TestBackend {
        async fn save_item(&self, item: &MenuItem) -> CoreResult<()> {
            self.menu.lock().unwrap().insert(item.id, item.clone());
            Ok(())
        }

        async fn get_item(&self, id: Uuid) -> CoreResult<Option<MenuItem>> {
            Ok(self.menu.lock().unwrap().get(&id).cloned())
        }

        async fn list_by_restaurant(&self, restaurant_id: Uuid) -> CoreResult<Vec<MenuItem>> {
            Ok(self
                .menu
                .lock()
                .unwrap()
                .values()
                .filter(|m| m.restaurant_id == restaurant_id)
                .cloned()
                .collect())
        }

        async fn delete_item(&self, id: Uuid) -> CoreResult<()> {
            self.menu.lock().unwrap().remove(&id);
            Ok(())
        }
    }

    #[async_trait]
    impl crate::repository::OrderRepository for TestBackend {
        async fn insert(&self, order: &Order) -> CoreResult<()> {
            let mut orders = self.orders.lock().unwrap();
            if orders.contains_key(&order.id) {
                return Err(CoreError::Conflict(format!("order {} exists", order.id)));
            }
            orders.insert(order.id, order.clone());
            Ok(())
        }

        async fn get(&self, id: Uuid) -> CoreResult<Option<Order>> {
            Ok(self.orders.lock().unwrap().get(&id).cloned())
        }

        async fn update(&self, order: &Order) -> CoreResult<Order> {
            let mut orders = self.orders.lock().unwrap();
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
            self.orders.lock().unwrap().remove(&id);
            Ok(())
        }

        async fn list(&self) -> CoreResult<Vec<Order>> {
            Ok(self.orders.lock().unwrap().values().cloned().collect())
        }
    }

    struct Fixture {
        backend: Arc<TestBackend>,
        machine: OrderStateMachine,
        customer: Uuid,
        restaurant: Uuid,
        driver: Uuid,
        soup: Uuid,
        bread: Uuid,
    }

    fn profile(name: &str) -> Profile {
        Profile {
            name: name.to_string(),
            surname: "Testaitis".to_string(),
            phone_number: "+37060000000".to_string(),
            address: "Pilies g. 1".to_string(),
        }
    }

    async fn fixture() -> Fixture {
        let backend = Arc::new(TestBackend::default());

        let customer = Actor::new_customer("jonas".into(), "pw".into(), profile("Jonas")).unwrap();
        let driver = Actor::new_driver(
            "vairuotojas".into(),
            "pw".into(),
            profile("Tomas"),
            "LT-555".into(),
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            VehicleType::Car,
        )
        .unwrap();
        let restaurant = Actor::new_restaurant(
            "trobele".into(),
            "pw".into(),
            profile("Ona"),
            "Senoji Trobele".into(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
        )
        .unwrap();

        backend.save_user(&customer).await.unwrap();
        backend.save_user(&driver).await.unwrap();
        backend.save_user(&restaurant).await.unwrap();

        let soup = MenuItem::new(
            "Saltibarsciai".into(),
            "beets, kefir".into(),
            10.0,
            false,
            false,
            restaurant.id,
        )
        .unwrap();
        let bread = MenuItem::new(
            "Garlic bread".into(),
            "bread, garlic".into(),
            5.0,
            false,
            true,
            restaurant.id,
        )
        .unwrap();
        backend.save_item(&soup).await.unwrap();
        backend.save_item(&bread).await.unwrap();

        let machine = OrderStateMachine::new(
            backend.clone(),
            backend.clone(),
            backend.clone(),
            PricingEngine::new(PricingConfig::default()),
            LoyaltyCalculator::default(),
        );

        Fixture {
            backend,
            machine,
            customer: customer.id,
            restaurant: restaurant.id,
            driver: driver.id,
            soup: soup.id,
            bread: bread.id,
        }
    }

    fn peak() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(13, 0, 0)
            .unwrap()
    }

    fn off_peak() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn lines(fx: &Fixture) -> Vec<LineRequest> {
        vec![
            LineRequest {
                menu_item_id: fx.soup,
                quantity: 1,
            },
            LineRequest {
                menu_item_id: fx.bread,
                quantity: 2,
            },
        ]
    }

    #[tokio::test]
    async fn test_create_order_applies_peak_pricing() {
        let fx = fixture().await;
        let order = fx
            .machine
            .create_order_at(fx.customer, fx.restaurant, lines(&fx), peak())
            .await
            .unwrap();
        assert_eq!(order.base_price(), 20.0);
        assert_eq!(order.price, 30.0);
        assert_eq!(order.status, OrderStatus::Placed);
    }

    #[tokio::test]
    async fn test_create_order_off_peak_keeps_base() {
        let fx = fixture().await;
        let order = fx
            .machine
            .create_order_at(fx.customer, fx.restaurant, lines(&fx), off_peak())
            .await
            .unwrap();
        assert_eq!(order.price, 20.0);
    }

    #[tokio::test]
    async fn test_create_order_rejects_empty_items() {
        let fx = fixture().await;
        let result = fx
            .machine
            .create_order(fx.customer, fx.restaurant, Vec::new())
            .await;
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_order_rejects_foreign_menu_item() {
        let fx = fixture().await;
        let other = Actor::new_restaurant(
            "kitas".into(),
            "pw".into(),
            profile("Petras"),
            "Kitas Baras".into(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
        )
        .unwrap();
        fx.backend.save_user(&other).await.unwrap();

        let result = fx
            .machine
            .create_order(fx.customer, other.id, lines(&fx))
            .await;
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    async fn drive_to_delivered(fx: &Fixture, order_id: Uuid) {
        fx.machine
            .set_status(order_id, OrderStatus::Accepted, fx.restaurant)
            .await
            .unwrap();
        fx.machine
            .set_status(order_id, OrderStatus::Ready, fx.restaurant)
            .await
            .unwrap();
        fx.machine.assign_driver(order_id, fx.driver).await.unwrap();
        fx.machine
            .set_status(order_id, OrderStatus::OutForDelivery, fx.driver)
            .await
            .unwrap();
        fx.machine
            .set_status(order_id, OrderStatus::Delivered, fx.driver)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_completion_awards_loyalty_points() {
        let fx = fixture().await;
        let order = fx
            .machine
            .create_order_at(
                fx.customer,
                fx.restaurant,
                vec![LineRequest {
                    menu_item_id: fx.soup,
                    quantity: 10,
                }],
                off_peak(),
            )
            .await
            .unwrap();
        assert_eq!(order.price, 100.0);

        drive_to_delivered(&fx, order.id).await;
        let completed = fx
            .machine
            .set_status(order.id, OrderStatus::Completed, fx.driver)
            .await
            .unwrap();
        assert_eq!(completed.status, OrderStatus::Completed);

        let customer = fx.backend.get_user(fx.customer).await.unwrap().unwrap();
        assert_eq!(customer.loyalty_points(), Some(10));
    }

    #[tokio::test]
    async fn test_no_points_before_completion() {
        let fx = fixture().await;
        let order = fx
            .machine
            .create_order_at(fx.customer, fx.restaurant, lines(&fx), peak())
            .await
            .unwrap();
        drive_to_delivered(&fx, order.id).await;

        let customer = fx.backend.get_user(fx.customer).await.unwrap().unwrap();
        assert_eq!(customer.loyalty_points(), Some(0));
    }

    #[tokio::test]
    async fn test_completed_order_is_locked() {
        let fx = fixture().await;
        let order = fx
            .machine
            .create_order_at(fx.customer, fx.restaurant, lines(&fx), off_peak())
            .await
            .unwrap();
        drive_to_delivered(&fx, order.id).await;
        fx.machine
            .set_status(order.id, OrderStatus::Completed, fx.driver)
            .await
            .unwrap();

        let before = fx.machine.get_order(order.id).await.unwrap();
        let result = fx
            .machine
            .set_status(order.id, OrderStatus::Delivered, fx.driver)
            .await;
        assert!(matches!(result, Err(CoreError::OrderLocked(_))));

        let after = fx.machine.get_order(order.id).await.unwrap();
        assert_eq!(after.status, before.status);
        assert_eq!(after.version, before.version);
        assert_eq!(after.price, before.price);
    }

    #[tokio::test]
    async fn test_second_claim_conflicts() {
        let fx = fixture().await;
        let other_driver = Actor::new_driver(
            "antras".into(),
            "pw".into(),
            profile("Rokas"),
            "LT-777".into(),
            NaiveDate::from_ymd_opt(1985, 3, 3).unwrap(),
            VehicleType::Bicycle,
        )
        .unwrap();
        fx.backend.save_user(&other_driver).await.unwrap();

        let order = fx
            .machine
            .create_order(fx.customer, fx.restaurant, lines(&fx))
            .await
            .unwrap();

        let claimed = fx.machine.assign_driver(order.id, fx.driver).await.unwrap();
        assert_eq!(claimed.status, OrderStatus::DriverAssigned);
        assert_eq!(claimed.driver_id, Some(fx.driver));

        let result = fx.machine.assign_driver(order.id, other_driver.id).await;
        assert!(matches!(result, Err(CoreError::Conflict(_))));

        let stored = fx.machine.get_order(order.id).await.unwrap();
        assert_eq!(stored.driver_id, Some(fx.driver));
    }

    #[tokio::test]
    async fn test_stale_write_loses_the_race() {
        let fx = fixture().await;
        let order = fx
            .machine
            .create_order(fx.customer, fx.restaurant, lines(&fx))
            .await
            .unwrap();

        // Two actors snapshot the same version; only the first write lands.
        let snapshot_a = fx.backend.get(order.id).await.unwrap().unwrap();
        let snapshot_b = snapshot_a.clone();

        let mut first = snapshot_a;
        first.driver_id = Some(fx.driver);
        first.status = OrderStatus::DriverAssigned;
        fx.backend.update(&first).await.unwrap();

        let mut second = snapshot_b;
        second.driver_id = Some(Uuid::new_v4());
        second.status = OrderStatus::DriverAssigned;
        let result = fx.backend.update(&second).await;
        assert!(matches!(result, Err(CoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_claim_rejects_non_driver() {
        let fx = fixture().await;
        let order = fx
            .machine
            .create_order(fx.customer, fx.restaurant, lines(&fx))
            .await
            .unwrap();
        let result = fx.machine.assign_driver(order.id, fx.customer).await;
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_cancel_accepted_order_fails_and_preserves_it() {
        let fx = fixture().await;
        let order = fx
            .machine
            .create_order(fx.customer, fx.restaurant, lines(&fx))
            .await
            .unwrap();
        fx.machine
            .set_status(order.id, OrderStatus::Accepted, fx.restaurant)
            .await
            .unwrap();

        let result = fx.machine.cancel_order(order.id).await;
        assert!(matches!(result, Err(CoreError::Validation(_))));

        let stored = fx.machine.get_order(order.id).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Accepted);
    }

    #[tokio::test]
    async fn test_cancel_marks_and_retains_the_record() {
        let fx = fixture().await;
        let order = fx
            .machine
            .create_order(fx.customer, fx.restaurant, lines(&fx))
            .await
            .unwrap();
        let cancelled = fx.machine.cancel_order(order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        let stored = fx.machine.get_order(order.id).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_purge_removes_placed_order() {
        let fx = fixture().await;
        let order = fx
            .machine
            .create_order(fx.customer, fx.restaurant, lines(&fx))
            .await
            .unwrap();
        fx.machine.purge_order(order.id).await.unwrap();
        let result = fx.machine.get_order(order.id).await;
        assert!(matches!(result, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_last_line_fails() {
        let fx = fixture().await;
        let order = fx
            .machine
            .create_order(
                fx.customer,
                fx.restaurant,
                vec![LineRequest {
                    menu_item_id: fx.soup,
                    quantity: 1,
                }],
            )
            .await
            .unwrap();
        let result = fx.machine.remove_line(order.id, fx.soup).await;
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_remove_line_reprices_at_creation_time() {
        let fx = fixture().await;
        let order = fx
            .machine
            .create_order_at(fx.customer, fx.restaurant, lines(&fx), peak())
            .await
            .unwrap();
        assert_eq!(order.price, 30.0);

        let updated = fx.machine.remove_line(order.id, fx.bread).await.unwrap();
        assert_eq!(updated.lines.len(), 1);
        // The peak reference is the creation time, so the multiplier
        // sticks regardless of when the edit happens.
        let reference = updated.created_at.with_timezone(&Local).naive_local();
        let engine = PricingEngine::new(PricingConfig::default());
        assert_eq!(updated.price, engine.price_at(10.0, reference));
    }

    #[tokio::test]
    async fn test_wrong_role_is_unauthorized() {
        let fx = fixture().await;
        let order = fx
            .machine
            .create_order(fx.customer, fx.restaurant, lines(&fx))
            .await
            .unwrap();
        let result = fx
            .machine
            .set_status(order.id, OrderStatus::Accepted, fx.driver)
            .await;
        assert!(matches!(result, Err(CoreError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_other_restaurant_cannot_accept() {
        let fx = fixture().await;
        let other = Actor::new_restaurant(
            "kitas".into(),
            "pw".into(),
            profile("Petras"),
            "Kitas Baras".into(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
        )
        .unwrap();
        fx.backend.save_user(&other).await.unwrap();

        let order = fx
            .machine
            .create_order(fx.customer, fx.restaurant, lines(&fx))
            .await
            .unwrap();
        let result = fx
            .machine
            .set_status(order.id, OrderStatus::Accepted, other.id)
            .await;
        assert!(matches!(result, Err(CoreError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_driver_assigned_not_settable_directly() {
        let fx = fixture().await;
        let order = fx
            .machine
            .create_order(fx.customer, fx.restaurant, lines(&fx))
            .await
            .unwrap();
        let result = fx
            .machine
            .set_status(order.id, OrderStatus::DriverAssigned, fx.driver)
            .await;
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_chat_lock_follows_terminal_statuses() {
        let fx = fixture().await;
        let order = fx
            .machine
            .create_order(fx.customer, fx.restaurant, lines(&fx))
            .await
            .unwrap();
        assert!(!fx.machine.is_chat_locked(order.id).await.unwrap());

        fx.machine.cancel_order(order.id).await.unwrap();
        assert!(fx.machine.is_chat_locked(order.id).await.unwrap());

        let order2 = fx
            .machine
            .create_order(fx.customer, fx.restaurant, lines(&fx))
            .await
            .unwrap();
        drive_to_delivered(&fx, order2.id).await;
        assert!(!fx.machine.is_chat_locked(order2.id).await.unwrap());
        fx.machine
            .set_status(order2.id, OrderStatus::Completed, fx.driver)
            .await
            .unwrap();
        assert!(fx.machine.is_chat_locked(order2.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_rejection_is_terminal() {
        let fx = fixture().await;
        let order = fx
            .machine
            .create_order(fx.customer, fx.restaurant, lines(&fx))
            .await
            .unwrap();
        fx.machine
            .set_status(order.id, OrderStatus::Rejected, fx.restaurant)
            .await
            .unwrap();
        let result = fx
            .machine
            .set_status(order.id, OrderStatus::Accepted, fx.restaurant)
            .await;
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }
}
