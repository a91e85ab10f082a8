use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use morsel_core::{Actor, CoreError, Profile, Role, UserRepository, VehicleType};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterCustomerRequest {
    pub login: String,
    pub credential: String,
    pub profile: Profile,
}

#[derive(Debug, Deserialize)]
pub struct RegisterDriverRequest {
    pub login: String,
    pub credential: String,
    pub profile: Profile,
    pub licence: String,
    pub birth_date: NaiveDate,
    pub vehicle: VehicleType,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRestaurantRequest {
    pub login: String,
    pub credential: String,
    pub profile: Profile,
    pub restaurant_name: String,
    pub opens_at: NaiveTime,
    pub closes_at: NaiveTime,
}

/// Public view of an actor; the credential never leaves the store.
#[derive(Debug, Serialize)]
pub struct ActorResponse {
    pub id: Uuid,
    pub login: String,
    pub role: Role,
    pub name: String,
    pub loyalty_points: Option<i64>,
}

impl From<&Actor> for ActorResponse {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id,
            login: actor.login.clone(),
            role: actor.role(),
            name: actor.profile.name.clone(),
            loyalty_points: actor.loyalty_points(),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/customers", post(register_customer))
        .route("/users/drivers", post(register_driver))
        .route("/users/restaurants", post(register_restaurant))
        .route("/users/{id}", get(get_user))
}

/// POST /users/customers
async fn register_customer(
    State(state): State<AppState>,
    Json(req): Json<RegisterCustomerRequest>,
) -> Result<(StatusCode, Json<ActorResponse>), AppError> {
    let actor = Actor::new_customer(req.login, req.credential, req.profile)?;
    state.store.save_user(&actor).await?;
    Ok((StatusCode::CREATED, Json(ActorResponse::from(&actor))))
}

/// POST /users/drivers
async fn register_driver(
    State(state): State<AppState>,
    Json(req): Json<RegisterDriverRequest>,
) -> Result<(StatusCode, Json<ActorResponse>), AppError> {
    let actor = Actor::new_driver(
        req.login,
        req.credential,
        req.profile,
        req.licence,
        req.birth_date,
        req.vehicle,
    )?;
    state.store.save_user(&actor).await?;
    Ok((StatusCode::CREATED, Json(ActorResponse::from(&actor))))
}

/// POST /users/restaurants
async fn register_restaurant(
    State(state): State<AppState>,
    Json(req): Json<RegisterRestaurantRequest>,
) -> Result<(StatusCode, Json<ActorResponse>), AppError> {
    let actor = Actor::new_restaurant(
        req.login,
        req.credential,
        req.profile,
        req.restaurant_name,
        req.opens_at,
        req.closes_at,
    )?;
    state.store.save_user(&actor).await?;
    Ok((StatusCode::CREATED, Json(ActorResponse::from(&actor))))
}

/// GET /users/{id}
async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ActorResponse>, AppError> {
    let actor = state
        .store
        .get_user(user_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("user {user_id}")))?;
    Ok(Json(ActorResponse::from(&actor)))
}
