use doable_core::{AppError, ValidationError};
use doable_services::RemoteServiceError;
use thiserror::Error;

/// Failure of a state container action.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Rejected before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The remote call failed; local state was left unchanged.
    #[error(transparent)]
    Remote(#[from] RemoteServiceError),
}

impl StoreError {
    /// User-friendly message for UI display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.user_message(),
            Self::Remote(_) => "Something went wrong talking to the task service. Please try again.",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(v) => AppError::Validation(v),
            StoreError::Remote(r) => r.into(),
        }
    }
}
