//! Centralized error types for Doable.
//!
//! This module provides a typed error hierarchy that:
//! - Separates client-side validation from remote and storage failures
//! - Provides user-friendly messages suitable for notifications
//! - Preserves full error context for logging

use thiserror::Error;

/// Top-level application error type.
///
/// Every crate-level error in the workspace converts into this type.
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Validation(e) => e.user_message(),
            AppError::Network(e) => e.user_message(),
            AppError::Persistence(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Client-side precondition failures, raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("project name cannot be empty")]
    EmptyProjectName,

    #[error("project limit of {max} reached")]
    ProjectLimitReached { max: usize },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("priority must be between 1 and 4, got {0}")]
    PriorityOutOfRange(u8),

    #[error("no project selected and no default project available")]
    NoDefaultProject,
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::EmptyProjectName => "Give the project a name.",
            ValidationError::ProjectLimitReached { .. } => {
                "You have reached the maximum number of projects."
            }
            ValidationError::MissingField(_) => "Fill in all required fields.",
            ValidationError::PriorityOutOfRange(_) => "Priority must be between 1 and 4.",
            ValidationError::NoDefaultProject => "Choose a project for this task.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The task service is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { status: 401 | 403, .. } => {
                "The task service rejected the API token. Check your settings."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Local persistence errors. These are logged, never shown to the user.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Stored data is corrupt: {0}")]
    Corruption(String),
}

impl PersistenceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            PersistenceError::Unavailable(_) => "Offline copy unavailable.",
            PersistenceError::Corruption(_) => "Offline copy was unreadable and has been ignored.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API token configured: set api.token or {0}")]
    MissingToken(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::MissingToken(_) => "Add your API token to the settings.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
