use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, CoreResult};

pub const MIN_DRIVER_AGE_YEARS: i32 = 18;

/// Role discriminant, used for authorization checks on order transitions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Customer,
    Driver,
    Restaurant,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    Bicycle,
    Motorcycle,
    Car,
}

/// Profile attributes shared by every role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub surname: String,
    pub phone_number: String,
    pub address: String,
}

/// Role-specific attributes. Modeled as a tagged union rather than an
/// inheritance chain; the discriminant doubles as the authorization role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    Customer {
        loyalty_points: i64,
    },
    Driver {
        loyalty_points: i64,
        licence: String,
        birth_date: NaiveDate,
        vehicle: VehicleType,
    },
    Restaurant {
        restaurant_name: String,
        opens_at: NaiveTime,
        closes_at: NaiveTime,
    },
}

/// A registered platform user: customer, driver, or restaurant.
///
/// `credential` is an opaque secret handled by the external auth
/// collaborator; this crate never interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub login: String,
    pub credential: String,
    pub profile: Profile,
    #[serde(flatten)]
    pub role: ActorRole,
}

impl Actor {
    pub fn new_customer(login: String, credential: String, profile: Profile) -> CoreResult<Self> {
        if login.trim().is_empty() {
            return Err(CoreError::Validation("login must not be empty".into()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            login,
            credential,
            profile,
            role: ActorRole::Customer { loyalty_points: 0 },
        })
    }

    pub fn new_driver(
        login: String,
        credential: String,
        profile: Profile,
        licence: String,
        birth_date: NaiveDate,
        vehicle: VehicleType,
    ) -> CoreResult<Self> {
        if login.trim().is_empty() {
            return Err(CoreError::Validation("login must not be empty".into()));
        }
        if licence.trim().is_empty() {
            return Err(CoreError::Validation("driver licence is required".into()));
        }
        let today = Utc::now().date_naive();
        if !is_of_age(birth_date, today) {
            return Err(CoreError::Validation(format!(
                "drivers must be at least {MIN_DRIVER_AGE_YEARS} years old"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            login,
            credential,
            profile,
            role: ActorRole::Driver {
                loyalty_points: 0,
                licence,
                birth_date,
                vehicle,
            },
        })
    }

    pub fn new_restaurant(
        login: String,
        credential: String,
        profile: Profile,
        restaurant_name: String,
        opens_at: NaiveTime,
        closes_at: NaiveTime,
    ) -> CoreResult<Self> {
        if login.trim().is_empty() {
            return Err(CoreError::Validation("login must not be empty".into()));
        }
        if restaurant_name.trim().is_empty() {
            return Err(CoreError::Validation("restaurant name is required".into()));
        }
        if opens_at >= closes_at {
            return Err(CoreError::Validation(
                "opening time must precede closing time".into(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            login,
            credential,
            profile,
            role: ActorRole::Restaurant {
                restaurant_name,
                opens_at,
                closes_at,
            },
        })
    }

    pub fn role(&self) -> Role {
        match self.role {
            ActorRole::Customer { .. } => Role::Customer,
            ActorRole::Driver { .. } => Role::Driver,
            ActorRole::Restaurant { .. } => Role::Restaurant,
        }
    }

    /// Loyalty balance for customer-capable roles; restaurants carry none.
    pub fn loyalty_points(&self) -> Option<i64> {
        match self.role {
            ActorRole::Customer { loyalty_points } => Some(loyalty_points),
            ActorRole::Driver { loyalty_points, .. } => Some(loyalty_points),
            ActorRole::Restaurant { .. } => None,
        }
    }

    /// Credit earned points onto a customer-capable actor.
    pub fn credit_loyalty(&mut self, points: i64) -> CoreResult<()> {
        match &mut self.role {
            ActorRole::Customer { loyalty_points }
            | ActorRole::Driver { loyalty_points, .. } => {
                *loyalty_points += points;
                Ok(())
            }
            ActorRole::Restaurant { .. } => Err(CoreError::Validation(
                "restaurants do not hold loyalty points".into(),
            )),
        }
    }
}

fn is_of_age(birth_date: NaiveDate, today: NaiveDate) -> bool {
    match birth_date.checked_add_months(chrono::Months::new(MIN_DRIVER_AGE_YEARS as u32 * 12)) {
        Some(threshold) => threshold <= today,
        None => false,
    }
}
