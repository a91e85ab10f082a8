use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use morsel_catalog::{menu, MenuItem, MenuRepository};
use morsel_core::{CoreError, Role, UserRepository};
use morsel_order::{Order, OrderStatus};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddMenuItemRequest {
    pub name: String,
    pub ingredients: String,
    pub price: f64,
    #[serde(default)]
    pub spicy: bool,
    #[serde(default)]
    pub vegan: bool,
}

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    #[serde(default)]
    pub vegan: bool,
    pub search: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/restaurants/{id}/orders/{order_id}/accept",
            post(accept_order),
        )
        .route(
            "/restaurants/{id}/orders/{order_id}/reject",
            post(reject_order),
        )
        .route(
            "/restaurants/{id}/orders/{order_id}/ready",
            post(mark_ready),
        )
        .route("/restaurants/{id}/orders/pending", get(pending_orders))
        .route("/restaurants/{id}/menu", get(get_menu).post(add_menu_item))
        .route(
            "/restaurants/{id}/menu/{item_id}",
            axum::routing::delete(delete_menu_item),
        )
}

/// POST /restaurants/{id}/orders/{order_id}/accept
async fn accept_order(
    State(state): State<AppState>,
    Path((restaurant_id, order_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .machine
        .set_status(order_id, OrderStatus::Accepted, restaurant_id)
        .await?;
    Ok(Json(order))
}

/// POST /restaurants/{id}/orders/{order_id}/reject
async fn reject_order(
    State(state): State<AppState>,
    Path((restaurant_id, order_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .machine
        .set_status(order_id, OrderStatus::Rejected, restaurant_id)
        .await?;
    Ok(Json(order))
}

/// POST /restaurants/{id}/orders/{order_id}/ready
async fn mark_ready(
    State(state): State<AppState>,
    Path((restaurant_id, order_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .machine
        .set_status(order_id, OrderStatus::Ready, restaurant_id)
        .await?;
    Ok(Json(order))
}

/// GET /restaurants/{id}/orders/pending
async fn pending_orders(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(
        state.queries.pending_for_restaurant(restaurant_id).await?,
    ))
}

/// GET /restaurants/{id}/menu
async fn get_menu(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
    Query(query): Query<MenuQuery>,
) -> Result<Json<Vec<MenuItem>>, AppError> {
    let mut items = state.store.list_by_restaurant(restaurant_id).await?;
    if query.vegan {
        items = menu::vegan_only(&items);
    }
    if let Some(term) = &query.search {
        items = menu::search_by_name(&items, term);
    }
    Ok(Json(items))
}

/// POST /restaurants/{id}/menu
async fn add_menu_item(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
    Json(req): Json<AddMenuItemRequest>,
) -> Result<(StatusCode, Json<MenuItem>), AppError> {
    let restaurant = state
        .store
        .get_user(restaurant_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("user {restaurant_id}")))?;
    if restaurant.role() != Role::Restaurant {
        return Err(CoreError::Validation("actor is not a restaurant".into()).into());
    }

    let item = MenuItem::new(
        req.name,
        req.ingredients,
        req.price,
        req.spicy,
        req.vegan,
        restaurant_id,
    )?;
    state.store.save_item(&item).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// DELETE /restaurants/{id}/menu/{item_id}
async fn delete_menu_item(
    State(state): State<AppState>,
    Path((restaurant_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    let item = state
        .store
        .get_item(item_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("menu item {item_id}")))?;
    if item.restaurant_id != restaurant_id {
        return Err(
            CoreError::Unauthorized("menu item belongs to another restaurant".into()).into(),
        );
    }
    state.store.delete_item(item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
