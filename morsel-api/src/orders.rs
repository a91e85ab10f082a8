use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use morsel_order::{LineRequest, Order, OrderStats, OrderStatus};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,
    pub items: Vec<LineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    pub actor_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ChatLockResponse {
    pub order_id: Uuid,
    pub locked: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/stats", get(order_stats))
        .route("/orders/available", get(available_orders))
        .route("/orders/status/{status}", get(orders_by_status))
        .route("/orders/restaurant/{id}", get(orders_by_restaurant))
        .route("/orders/restaurant/{id}/pending", get(pending_orders))
        .route("/orders/driver/{id}", get(orders_by_driver))
        .route("/orders/customer/{id}/active", get(active_orders))
        .route("/orders/{id}", get(get_order).delete(cancel_order))
        .route("/orders/{id}/status", put(update_status))
        .route("/orders/{id}/lines/{item_id}", delete(remove_line))
        .route("/orders/{id}/chat-locked", get(chat_locked))
}

/// POST /orders
async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = state
        .machine
        .create_order(req.customer_id, req.restaurant_id, req.items)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders/{id}
async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.machine.get_order(order_id).await?))
}

/// DELETE /orders/{id}
/// Customer cancellation; the order is retained with status CANCELLED.
async fn cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.machine.cancel_order(order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /orders/{id}/status
async fn update_status(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .machine
        .set_status(order_id, req.status, req.actor_id)
        .await?;
    Ok(Json(order))
}

/// DELETE /orders/{id}/lines/{item_id}
async fn remove_line(
    State(state): State<AppState>,
    Path((order_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Order>, AppError> {
    let order = state.machine.remove_line(order_id, item_id).await?;
    Ok(Json(order))
}

/// GET /orders/{id}/chat-locked
async fn chat_locked(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<ChatLockResponse>, AppError> {
    let locked = state.machine.is_chat_locked(order_id).await?;
    Ok(Json(ChatLockResponse {
        order_id,
        locked,
    }))
}

/// GET /orders/available
async fn available_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.queries.unclaimed().await?))
}

/// GET /orders/status/{status}
async fn orders_by_status(
    State(state): State<AppState>,
    Path(status): Path<OrderStatus>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.queries.by_status(status).await?))
}

/// GET /orders/restaurant/{id}
async fn orders_by_restaurant(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.queries.by_restaurant(restaurant_id).await?))
}

/// GET /orders/restaurant/{id}/pending
async fn pending_orders(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.queries.pending_for_restaurant(restaurant_id).await?))
}

/// GET /orders/driver/{id}
async fn orders_by_driver(
    State(state): State<AppState>,
    Path(driver_id): Path<Uuid>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.queries.by_driver(driver_id).await?))
}

/// GET /orders/customer/{id}/active
async fn active_orders(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.queries.active_for_customer(customer_id).await?))
}

/// GET /orders/stats
async fn order_stats(State(state): State<AppState>) -> Result<Json<OrderStats>, AppError> {
    Ok(Json(state.queries.stats().await?))
}
