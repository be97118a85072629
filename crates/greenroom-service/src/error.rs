use thiserror::Error;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    DatabaseError(#[from] greenroom_db::error::DbError),

    #[error(transparent)]
    ScheduleError(#[from] greenroom_schedule::error::ScheduleError),

    #[error(transparent)]
    CoreError(#[from] greenroom_core::error::CoreError),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Notification error: {0}")]
    NotificationError(String),

    #[error("Diesel error: {0}")]
    DieselError(#[from] diesel::result::Error),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
