use thiserror::Error;

/// The specific field a mutation was rejected on.
///
/// Validation happens before any statement touches the store, so a
/// `Validation` error always means the store is exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidField {
    #[error("name must not be blank")]
    BlankName,
    #[error("destination must not be blank")]
    BlankDestination,
    #[error("distance must be a positive number")]
    NonPositiveDistance,
}

#[derive(Debug, Error)]
pub enum TripError {
    /// Rejected input. An expected outcome, not a fault: callers surface
    /// it to the user and nothing is logged.
    #[error("validation failed: {0}")]
    Validation(#[from] InvalidField),
    /// The mutation targeted an id that is no longer in the store.
    #[error("trip {id} not found")]
    NotFound { id: i64 },
    /// The underlying SQLite layer failed.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type TripResult<T> = std::result::Result<T, TripError>;
