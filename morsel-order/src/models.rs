use chrono::{DateTime, Utc};
use morsel_core::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order status in the delivery lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Placed,
    Accepted,
    Ready,
    DriverAssigned,
    OutForDelivery,
    Delivered,
    Completed,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    /// Terminal states accept no further transitions. COMPLETED is the
    /// locked success state; CANCELLED/REJECTED are failure sinks.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }

    /// Check if a status transition follows the lifecycle graph.
    /// DRIVER_ASSIGNED only enters the graph through driver assignment,
    /// so it never appears as a target here.
    pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
        matches!(
            (from, to),
            (OrderStatus::Placed, OrderStatus::Accepted)
                | (OrderStatus::Placed, OrderStatus::Rejected)
                | (OrderStatus::Placed, OrderStatus::Cancelled)
                | (OrderStatus::Accepted, OrderStatus::Ready)
                | (OrderStatus::Ready, OrderStatus::OutForDelivery)
                | (OrderStatus::DriverAssigned, OrderStatus::OutForDelivery)
                | (OrderStatus::OutForDelivery, OrderStatus::Delivered)
                | (OrderStatus::Delivered, OrderStatus::Completed)
        )
    }

    /// The role allowed to drive a transition into this status.
    pub fn authorized_role(self) -> Option<Role> {
        match self {
            OrderStatus::Accepted | OrderStatus::Rejected | OrderStatus::Ready => {
                Some(Role::Restaurant)
            }
            OrderStatus::OutForDelivery | OrderStatus::Delivered | OrderStatus::Completed => {
                Some(Role::Driver)
            }
            OrderStatus::Cancelled => Some(Role::Customer),
            // PLACED is set at creation, DRIVER_ASSIGNED by assign_driver.
            OrderStatus::Placed | OrderStatus::DriverAssigned => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Placed => "PLACED",
            OrderStatus::Accepted => "ACCEPTED",
            OrderStatus::Ready => "READY",
            OrderStatus::DriverAssigned => "DRIVER_ASSIGNED",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

/// One menu item on an order, with the unit price captured at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub menu_item_id: Uuid,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
}

impl OrderLine {
    pub fn subtotal(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

/// The single source of truth for a customer's food order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub name: String,
    /// Final price, post peak-hour pricing.
    pub price: f64,
    pub status: OrderStatus,
    pub customer_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub restaurant_id: Uuid,
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency token, bumped by the store on every write.
    pub version: u64,
}

impl Order {
    pub fn new(
        name: String,
        customer_id: Uuid,
        restaurant_id: Uuid,
        lines: Vec<OrderLine>,
        price: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            price,
            status: OrderStatus::Placed,
            customer_id,
            driver_id: None,
            restaurant_id,
            lines,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Sum of unit prices times quantities, before dynamic pricing.
    pub fn base_price(&self) -> f64 {
        self.lines.iter().map(OrderLine::subtotal).sum()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
