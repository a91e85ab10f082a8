pub mod loyalty;
pub mod machine;
pub mod models;
pub mod query;
pub mod repository;

pub use loyalty::LoyaltyCalculator;
pub use machine::{LineRequest, OrderStateMachine};
pub use models::{Order, OrderLine, OrderStatus};
pub use query::{DriverStats, OrderQueryService, OrderStats};
pub use repository::OrderRepository;
