pub mod actor;
pub mod repository;

pub use actor::{Actor, ActorRole, Profile, Role, VehicleType};
pub use repository::UserRepository;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("order is locked: {0}")]
    OrderLocked(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("internal store error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
