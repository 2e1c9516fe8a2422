use thiserror::Error;

use crate::domain::apartment::apartment_name::ApartmentNameError;

use super::apartment_manager::MAX_RECORDS;

// Shown for both denied access and backend trouble, so a caller cannot tell which it was.
const GENERIC_FAILURE: &str = "The apartment storage is not available right now";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApartmentError {
    #[error("Invalid apartment name: {0}")]
    InvalidName(ApartmentNameError),
    #[error("{}", GENERIC_FAILURE)]
    Unauthorized,
    #[error("Too many changes in a short time, wait a moment and try again")]
    RateLimited,
    #[error("Storage is full ({} apartments), delete one before saving under a new name", MAX_RECORDS)]
    CapacityExceeded,
    #[error("No saved apartment with that name")]
    NotFound,
    #[error("The saved apartment could not be read")]
    MalformedRecord,
    #[error("{}", GENERIC_FAILURE)]
    BackendUnavailable,
}
