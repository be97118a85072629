use thiserror::Error;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] greenroom_service::error::ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] greenroom_db::error::DbError),

    #[error(transparent)]
    ScheduleError(#[from] greenroom_schedule::error::ScheduleError),

    #[error(transparent)]
    CoreError(#[from] greenroom_core::error::CoreError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
