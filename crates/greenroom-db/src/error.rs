use thiserror::Error;

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Pool error: {0}")]
    PoolError(#[from] diesel_async::pooled_connection::bb8::RunError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Conditional availability save lost to a concurrent writer.
    #[error("Availability revision conflict")]
    RevisionConflict,

    /// Another booking already claimed this slot start.
    #[error("Slot already booked")]
    SlotTaken,

    #[error(transparent)]
    CoreError(#[from] greenroom_core::error::CoreError),
}

pub type DbResult<T> = std::result::Result<T, DbError>;
