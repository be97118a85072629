use thiserror::Error;

/// Scheduling domain errors.
///
/// Malformed day windows are deliberately not represented here: a day whose
/// `HH:MM` strings fail to parse contributes zero slots instead of failing
/// the whole computation.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

pub type ScheduleResult<T> = std::result::Result<T, ScheduleError>;
