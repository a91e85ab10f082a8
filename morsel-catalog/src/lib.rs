pub mod menu;
pub mod pricing;

pub use menu::{MenuItem, MenuRepository};
pub use pricing::{PricingConfig, PricingEngine};
