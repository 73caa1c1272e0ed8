use crate::model::ReservationStatus;
use crate::repository::RepositoryError;
use thiserror::Error;

// Errors raised by the hotel workflows
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HotelError {
    #[error("reservation {reservation_id} is {actual}, expected {expected}")]
    IllegalState {
        reservation_id: String,
        actual: ReservationStatus,
        expected: ReservationStatus,
    },

    #[error("reservation {reservation_id} cannot be edited from {from} to {to}")]
    IllegalEdit {
        reservation_id: String,
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type HotelResult<T> = Result<T, HotelError>;
