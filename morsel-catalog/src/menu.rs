use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use morsel_core::{CoreError, CoreResult};

/// A dish on a restaurant's menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: Uuid,
    pub name: String,
    pub ingredients: String,
    pub price: f64,
    pub spicy: bool,
    pub vegan: bool,
    pub restaurant_id: Uuid,
}

impl MenuItem {
    pub fn new(
        name: String,
        ingredients: String,
        price: f64,
        spicy: bool,
        vegan: bool,
        restaurant_id: Uuid,
    ) -> CoreResult<Self> {
        if name.trim().is_empty() {
            return Err(CoreError::Validation("menu item name is required".into()));
        }
        if price <= 0.0 {
            return Err(CoreError::Validation(
                "menu item price must be positive".into(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            ingredients,
            price,
            spicy,
            vegan,
            restaurant_id,
        })
    }
}

/// Repository trait for menu data access
#[async_trait]
pub trait MenuRepository: Send + Sync {
    async fn save_item(&self, item: &MenuItem) -> CoreResult<()>;

    async fn get_item(&self, id: Uuid) -> CoreResult<Option<MenuItem>>;

    async fn list_by_restaurant(&self, restaurant_id: Uuid) -> CoreResult<Vec<MenuItem>>;

    async fn delete_item(&self, id: Uuid) -> CoreResult<()>;
}

/// Menu projections used by the browse endpoints.
pub fn vegan_only(menu: &[MenuItem]) -> Vec<MenuItem> {
    menu.iter().filter(|m| m.vegan).cloned().collect()
}

pub fn within_price(menu: &[MenuItem], min: f64, max: f64) -> Vec<MenuItem> {
    menu.iter()
        .filter(|m| m.price >= min && m.price <= max)
        .cloned()
        .collect()
}

pub fn search_by_name(menu: &[MenuItem], term: &str) -> Vec<MenuItem> {
    let needle = term.to_lowercase();
    menu.iter()
        .filter(|m| m.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
