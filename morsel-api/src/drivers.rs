use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use morsel_order::{DriverStats, Order, OrderStatus};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/drivers/{id}/orders", get(driver_orders))
        .route("/drivers/{id}/orders/active", get(driver_active_orders))
        .route("/drivers/{id}/stats", get(driver_stats))
        .route("/drivers/{id}/orders/{order_id}/claim", post(claim_order))
        .route(
            "/drivers/{id}/orders/{order_id}/start-delivery",
            post(start_delivery),
        )
        .route("/drivers/{id}/orders/{order_id}/deliver", post(deliver))
        .route("/drivers/{id}/orders/{order_id}/complete", post(complete))
}

/// POST /drivers/{id}/orders/{order_id}/claim
async fn claim_order(
    State(state): State<AppState>,
    Path((driver_id, order_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Order>, AppError> {
    let order = state.machine.assign_driver(order_id, driver_id).await?;
    Ok(Json(order))
}

/// POST /drivers/{id}/orders/{order_id}/start-delivery
async fn start_delivery(
    State(state): State<AppState>,
    Path((driver_id, order_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .machine
        .set_status(order_id, OrderStatus::OutForDelivery, driver_id)
        .await?;
    Ok(Json(order))
}

/// POST /drivers/{id}/orders/{order_id}/deliver
async fn deliver(
    State(state): State<AppState>,
    Path((driver_id, order_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .machine
        .set_status(order_id, OrderStatus::Delivered, driver_id)
        .await?;
    Ok(Json(order))
}

/// POST /drivers/{id}/orders/{order_id}/complete
/// Completion locks the order and credits the customer's loyalty balance.
async fn complete(
    State(state): State<AppState>,
    Path((driver_id, order_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .machine
        .set_status(order_id, OrderStatus::Completed, driver_id)
        .await?;
    Ok(Json(order))
}

/// GET /drivers/{id}/orders
async fn driver_orders(
    State(state): State<AppState>,
    Path(driver_id): Path<Uuid>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.queries.by_driver(driver_id).await?))
}

/// GET /drivers/{id}/orders/active
async fn driver_active_orders(
    State(state): State<AppState>,
    Path(driver_id): Path<Uuid>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.queries.active_for_driver(driver_id).await?))
}

/// GET /drivers/{id}/stats
async fn driver_stats(
    State(state): State<AppState>,
    Path(driver_id): Path<Uuid>,
) -> Result<Json<DriverStats>, AppError> {
    Ok(Json(state.queries.driver_stats(driver_id).await?))
}
