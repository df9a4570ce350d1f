//! Errors raised by the task service client and the offline mirror.

use doable_core::{AppError, NetworkError, PersistenceError, ReqwestErrorExt};
use thiserror::Error;

/// Failure of a single remote call. Never retried by the client.
#[derive(Debug, Error)]
pub enum RemoteServiceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Task service error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl RemoteServiceError {
    /// HTTP status reported by the service, if the call got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<RemoteServiceError> for AppError {
    fn from(e: RemoteServiceError) -> Self {
        match e {
            RemoteServiceError::Network(err) => AppError::Network(err.into_network_error()),
            RemoteServiceError::Api { status, message } => {
                AppError::Network(NetworkError::ServerError { status, message })
            }
            RemoteServiceError::Decode(msg) => {
                AppError::Network(NetworkError::InvalidResponse(msg))
            }
            RemoteServiceError::InvalidUrl(err) => AppError::Other(err.into()),
        }
    }
}

/// Failure reading or writing the offline mirror.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Mirror storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Mirror encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Mirror worker failed: {0}")]
    Worker(String),
}

impl From<MirrorError> for AppError {
    fn from(e: MirrorError) -> Self {
        match e {
            MirrorError::Encoding(err) => {
                AppError::Persistence(PersistenceError::Corruption(err.to_string()))
            }
            other => AppError::Persistence(PersistenceError::Unavailable(other.to_string())),
        }
    }
}
